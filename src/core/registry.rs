//! # Service Registry
//!
//! 프로세스 전역 싱글톤 컨테이너입니다.
//!
//! ## 컴포넌트 등록 방식
//!
//! | 방식 | 대상 | 비고 |
//! |------|------|------|
//! | `#[repository]` | MongoDB 리포지토리 | `inventory`로 자동 수집, `Arc<T>` 필드 자동 주입 |
//! | `#[service]` | 설정만으로 만들 수 있는 서비스 | 위와 같음 |
//! | [`ServiceLocator::set`] | 저장소 트레이트 객체를 받는 서비스, 인프라 | 테스트가 메모리 저장소로 바꿔 끼웁니다 |
//!
//! 매크로 컴포넌트는 `instance()`가 `Arc<Self>`를 돌려주고, 직접 등록한 컴포넌트는
//! [`Singleton::instance`]가 `AppResult<Arc<Self>>`를 돌려줍니다.
//!
//! ```rust,ignore
//! ServiceLocator::set(database_handle);
//! let users = UserRepository::instance();
//!
//! ServiceLocator::set(Arc::new(TaskService::new(task_store)));
//! let task_service = TaskService::instance()?;
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::{debug, info};
use once_cell::sync::Lazy;

use crate::core::errors::{AppError, AppResult};

/// `#[service]` 매크로가 구현하는 트레이트
#[async_trait]
pub trait Service: Send + Sync {
    fn name(&self) -> &str;

    async fn init(&self) -> Result<(), Box<dyn std::error::Error>>;
}

/// `#[repository]` 매크로가 구현하는 트레이트
#[async_trait]
pub trait Repository: Send + Sync {
    fn name(&self) -> &str;

    fn collection_name(&self) -> &str;

    async fn init(&self) -> Result<(), Box<dyn std::error::Error>>;
}

/// `#[service]` 매크로가 제출하는 등록 정보. 이름은 `<name>_service`입니다.
pub struct ServiceRegistration {
    pub name: &'static str,
    pub constructor: fn() -> Box<dyn Any + Send + Sync>,
}

/// `#[repository]` 매크로가 제출하는 등록 정보. 이름은 `<name>_repository`입니다.
pub struct RepositoryRegistration {
    pub name: &'static str,
    pub constructor: fn() -> Box<dyn Any + Send + Sync>,
}

inventory::collect!(ServiceRegistration);
inventory::collect!(RepositoryRegistration);

type Instances = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;
type Constructor = fn() -> Box<dyn Any + Send + Sync>;

static LOCATOR: Lazy<ServiceLocator> = Lazy::new(ServiceLocator::new);

pub struct ServiceLocator {
    instances: RwLock<Instances>,
}

impl ServiceLocator {
    fn new() -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// 인스턴스를 등록합니다. 같은 타입이 이미 있으면 교체합니다.
    pub fn set<T: 'static + Send + Sync>(instance: Arc<T>) {
        debug!("📦 Registering: {}", Self::clean_type_name(std::any::type_name::<T>()));

        let mut instances = LOCATOR
            .instances
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        instances.insert(TypeId::of::<T>(), instance as Arc<dyn Any + Send + Sync>);
    }

    /// 매크로가 생성한 생성자에서 의존성을 주입할 때 씁니다.
    ///
    /// # Panics
    ///
    /// 등록되지 않았고 매크로 등록 정보도 없는 타입이면 패닉합니다.
    /// 시작 시 조립 순서가 잘못된 경우에만 일어나며, 요청 처리 중에는
    /// [`ServiceLocator::resolve`]를 씁니다.
    pub fn get<T: 'static + Send + Sync>() -> Arc<T> {
        match Self::resolve::<T>() {
            Ok(instance) => instance,
            Err(e) => panic!("{}", e),
        }
    }

    /// 등록된 인스턴스를 찾고, 없으면 매크로 등록 정보로 만듭니다.
    pub fn resolve<T: 'static + Send + Sync>() -> AppResult<Arc<T>> {
        if let Some(instance) = Self::try_get::<T>() {
            return Ok(instance);
        }

        let type_name = Self::clean_type_name(std::any::type_name::<T>());
        let constructor = Self::registered_constructor(type_name)
            .ok_or_else(|| AppError::InternalError(format!("등록되지 않은 컴포넌트: {}", type_name)))?;

        // 생성자가 다른 의존성을 조회하므로 잠금 없이 호출합니다.
        let instance = constructor()
            .downcast::<Arc<T>>()
            .map(|boxed| *boxed)
            .map_err(|_| AppError::InternalError(format!("컴포넌트 타입 불일치: {}", type_name)))?;

        Self::set(instance.clone());
        Ok(instance)
    }

    /// 이미 등록된 인스턴스만 조회합니다.
    pub fn try_get<T: 'static + Send + Sync>() -> Option<Arc<T>> {
        let instances = LOCATOR
            .instances
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        instances
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|instance| instance.downcast::<T>().ok())
    }

    /// 매크로로 등록된 리포지토리와 서비스를 모두 생성합니다.
    ///
    /// 의존성이 빠져 있으면 요청을 받기 전에 시작 단계에서 드러납니다.
    pub fn initialize_all() -> (usize, usize) {
        let mut repositories = 0;
        for registration in inventory::iter::<RepositoryRegistration>() {
            let _instance = (registration.constructor)();
            debug!("  ✓ {}", registration.name);
            repositories += 1;
        }

        let mut services = 0;
        for registration in inventory::iter::<ServiceRegistration>() {
            let _instance = (registration.constructor)();
            debug!("  ✓ {}", registration.name);
            services += 1;
        }

        info!("✅ 컴포넌트 초기화 완료: 리포지토리 {}개, 서비스 {}개", repositories, services);
        (repositories, services)
    }

    /// `UserRepository` → `user_repository`, `TokenService` → `token_service`
    fn registered_constructor(type_name: &str) -> Option<Constructor> {
        if let Some(entity) = type_name.strip_suffix("Repository") {
            let name = format!("{}_repository", entity.to_lowercase());
            return inventory::iter::<RepositoryRegistration>()
                .find(|registration| registration.name == name)
                .map(|registration| registration.constructor);
        }

        if let Some(entity) = type_name.strip_suffix("Service") {
            let name = format!("{}_service", entity.to_lowercase());
            return inventory::iter::<ServiceRegistration>()
                .find(|registration| registration.name == name)
                .map(|registration| registration.constructor);
        }

        None
    }

    fn clean_type_name(type_name: &str) -> &str {
        match type_name.rfind("::") {
            Some(pos) => &type_name[pos + 2..],
            None => type_name,
        }
    }
}

/// [`ServiceLocator::set`]으로 직접 등록되는 컴포넌트
pub trait Singleton: Sized + Send + Sync + 'static {
    fn instance() -> AppResult<Arc<Self>> {
        ServiceLocator::resolve::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use singleton_macro::service;

    struct Counter(u32);
    impl Singleton for Counter {}

    struct NeverRegistered;
    impl Singleton for NeverRegistered {}

    struct GreetingConfig {
        greeting: &'static str,
    }

    #[service(name = "greeting")]
    struct GreetingService {
        config: Arc<GreetingConfig>,
        calls: u32,
    }

    impl GreetingService {
        fn greet(&self, name: &str) -> String {
            format!("{}, {} ({})", self.config.greeting, name, self.calls)
        }
    }

    #[test]
    fn test_set_then_instance() {
        ServiceLocator::set(Arc::new(Counter(7)));

        let counter = Counter::instance().unwrap();
        assert_eq!(counter.0, 7);
        assert!(Arc::ptr_eq(&counter, &Counter::instance().unwrap()));
    }

    #[test]
    fn test_missing_component_is_an_error() {
        assert!(ServiceLocator::try_get::<NeverRegistered>().is_none());
        assert!(matches!(NeverRegistered::instance(), Err(AppError::InternalError(_))));
    }

    #[test]
    fn test_macro_service_gets_dependencies_injected() {
        ServiceLocator::set(Arc::new(GreetingConfig { greeting: "안녕" }));

        let service = GreetingService::instance();
        assert_eq!(service.greet("octo"), "안녕, octo (0)");
        assert_eq!(Service::name(service.as_ref()), "greeting_service");

        // 레지스트리 이름으로도 같은 싱글톤을 찾습니다
        let located = ServiceLocator::get::<GreetingService>();
        assert!(Arc::ptr_eq(&service, &located));
    }

    #[test]
    fn test_registered_constructor_naming() {
        assert!(ServiceLocator::registered_constructor("GreetingService").is_some());
        assert!(ServiceLocator::registered_constructor("UserRepository").is_some());
        assert!(ServiceLocator::registered_constructor("MissingService").is_none());
        assert!(ServiceLocator::registered_constructor("Plain").is_none());
    }

    #[test]
    fn test_clean_type_name() {
        assert_eq!(ServiceLocator::clean_type_name("a::b::TaskService"), "TaskService");
        assert_eq!(ServiceLocator::clean_type_name("Plain"), "Plain");
    }
}
