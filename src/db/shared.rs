//! 지연 초기화되는 프로세스 공유 연결
//!
//! 첫 요청이 연결을 시작하고, 그 사이 도착한 요청은 같은 시도의 결과를 받습니다.
//! 성공이든 실패든 마찬가지라서, 장애 중에 몰린 요청들도 타임아웃 한 번 만에 함께 503을 받습니다.
//! 한 번에 진행 중인 연결 시도는 최대 하나이며, 각 시도는 타임아웃으로 제한됩니다.
//! 실패한 시도는 셀을 비워 두므로 실패 이후에 도착한 요청이 다시 시도합니다.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use log::{info, warn};
use tokio::sync::{Mutex, OnceCell};

use crate::core::errors::{AppError, AppResult};

pub struct SharedConnection<T> {
    cell: OnceCell<T>,
    /// 시도 하나만 진행되도록 잡는 잠금. 직전 실패 사유를 함께 보관합니다.
    in_flight: Mutex<Option<String>>,
    failures: AtomicUsize,
    attempts: AtomicUsize,
    timeout: Duration,
}

impl<T> SharedConnection<T> {
    pub fn new(timeout: Duration) -> Self {
        Self {
            cell: OnceCell::new(),
            in_flight: Mutex::new(None),
            failures: AtomicUsize::new(0),
            attempts: AtomicUsize::new(0),
            timeout,
        }
    }

    /// 연결이 있으면 돌려주고, 없으면 `connect`로 한 번 만듭니다.
    ///
    /// 실패와 타임아웃은 모두 [`AppError::DatabaseUnavailable`]로 보고됩니다.
    /// 진행 중인 시도를 기다린 호출자는 그 시도가 실패하면 같은 에러를 받습니다.
    pub async fn get_or_connect<F, Fut>(&self, connect: F) -> AppResult<&T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        if let Some(connection) = self.cell.get() {
            return Ok(connection);
        }

        let failures_seen = self.failures.load(Ordering::SeqCst);
        let mut last_failure = self.in_flight.lock().await;

        if let Some(connection) = self.cell.get() {
            return Ok(connection);
        }

        // 기다리는 동안 끝난 시도가 실패했다
        if self.failures.load(Ordering::SeqCst) != failures_seen {
            if let Some(reason) = last_failure.as_ref() {
                return Err(AppError::DatabaseUnavailable(reason.clone()));
            }
        }

        match self.attempt(connect).await {
            Ok(connection) => {
                *last_failure = None;
                if self.cell.set(connection).is_err() {
                    warn!("데이터베이스 연결이 이미 초기화되어 있습니다");
                }
                self.cell
                    .get()
                    .ok_or_else(|| AppError::InternalError("데이터베이스 연결 초기화 실패".to_string()))
            }
            Err(reason) => {
                *last_failure = Some(reason.clone());
                self.failures.fetch_add(1, Ordering::SeqCst);
                Err(AppError::DatabaseUnavailable(reason))
            }
        }
    }

    async fn attempt<F, Fut>(&self, connect: F) -> Result<T, String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        info!("📡 데이터베이스 연결 시도 #{}", attempt);

        match tokio::time::timeout(self.timeout, connect()).await {
            Ok(Ok(connection)) => Ok(connection),
            Ok(Err(e)) => {
                warn!("데이터베이스 연결 실패 (시도 #{}): {}", attempt, e);
                match e {
                    AppError::DatabaseUnavailable(reason) => Err(reason),
                    other => Err(other.to_string()),
                }
            }
            Err(_) => {
                warn!("데이터베이스 연결 시간 초과 (시도 #{}, {:?})", attempt, self.timeout);
                Err(format!("{}초 안에 연결하지 못했습니다", self.timeout.as_secs_f32()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    impl<T> SharedConnection<T> {
        fn attempt_count(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_attempt() {
        let shared = Arc::new(SharedConnection::<u32>::new(Duration::from_secs(1)));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let shared = shared.clone();
            handles.push(tokio::spawn(async move {
                shared
                    .get_or_connect(|| async {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(42)
                    })
                    .await
                    .map(|value| *value)
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 42);
        }
        assert_eq!(shared.attempt_count(), 1);
        assert!(shared.cell.initialized());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_failed_attempt() {
        let shared = Arc::new(SharedConnection::<u32>::new(Duration::from_secs(1)));
        let started = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let shared = shared.clone();
            handles.push(tokio::spawn(async move {
                shared
                    .get_or_connect(|| async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Err(AppError::DatabaseError("connection refused".to_string()))
                    })
                    .await
                    .map(|value| *value)
            }));
        }

        for handle in handles {
            match handle.await.unwrap() {
                Err(AppError::DatabaseUnavailable(reason)) => assert!(reason.contains("connection refused")),
                other => panic!("Expected DatabaseUnavailable, got {:?}", other.map_err(|e| e.to_string())),
            }
        }
        assert_eq!(shared.attempt_count(), 1);
        assert!(started.elapsed() < Duration::from_millis(300));

        // 실패 이후에 온 요청은 새로 시도한다
        let value = shared.get_or_connect(|| async { Ok(7) }).await.unwrap();
        assert_eq!(*value, 7);
        assert_eq!(shared.attempt_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_attempt_is_retried_later() {
        let shared = SharedConnection::<&'static str>::new(Duration::from_secs(1));

        let first = shared
            .get_or_connect(|| async { Err(AppError::DatabaseError("refused".to_string())) })
            .await;
        assert!(matches!(first, Err(AppError::DatabaseUnavailable(_))));
        assert!(!shared.cell.initialized());

        let second = shared.get_or_connect(|| async { Ok("connected") }).await.unwrap();
        assert_eq!(*second, "connected");
        assert_eq!(shared.attempt_count(), 2);
    }

    #[tokio::test]
    async fn test_attempt_is_bounded_by_timeout() {
        let shared = SharedConnection::<u8>::new(Duration::from_millis(20));

        let result = shared
            .get_or_connect(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(1)
            })
            .await;

        assert!(matches!(result, Err(AppError::DatabaseUnavailable(_))));
        assert!(shared.cell.get().is_none());
    }
}
