//! Shared test helpers for application-layer tests.
//!
//! Provides a macro generating `RemoteControlClient` stub methods that fail
//! with "not expected", plus small in-memory port implementations.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::application::ports::{
    ConsoleSink, EventSink, LocalModuleStore, ProgressReporter, RefreshScheduler,
};
use crate::domain::{ApplicationModule, ServerEvent};

/// Generate `RemoteControlClient` stub methods that fail with "not expected".
///
/// Usage: `impl_controller_stubs!(login, get_services);`
/// List only the methods you do not implement yourself.
macro_rules! impl_controller_stubs {
    ($($method:ident),* $(,)?) => {
        $(impl_controller_stubs!(@one $method);)*
    };
    (@fail) => {
        Err($crate::domain::ControllerError::Decode("not expected".to_string()))
    };
    (@one login) => {
        async fn login(&self) -> $crate::application::ports::ControllerResult<()> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one get_applications) => {
        async fn get_applications(&self) -> $crate::application::ports::ControllerResult<Vec<cfdeploy_common::CloudApplication>> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one get_application) => {
        async fn get_application(&self, _: &str) -> $crate::application::ports::ControllerResult<cfdeploy_common::CloudApplication> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one create_application) => {
        async fn create_application(&self, _: &str, _: &$crate::domain::DeploymentInfo) -> $crate::application::ports::ControllerResult<()> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one start_application) => {
        async fn start_application(&self, _: &str) -> $crate::application::ports::ControllerResult<Option<cfdeploy_common::StartingInfo>> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one stop_application) => {
        async fn stop_application(&self, _: &str) -> $crate::application::ports::ControllerResult<()> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one delete_application) => {
        async fn delete_application(&self, _: &str) -> $crate::application::ports::ControllerResult<()> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one update_application_memory) => {
        async fn update_application_memory(&self, _: &str, _: u32) -> $crate::application::ports::ControllerResult<()> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one update_application_instances) => {
        async fn update_application_instances(&self, _: &str, _: u32) -> $crate::application::ports::ControllerResult<()> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one update_application_uris) => {
        async fn update_application_uris(&self, _: &str, _: &[String]) -> $crate::application::ports::ControllerResult<()> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one update_application_env) => {
        async fn update_application_env(&self, _: &str, _: &std::collections::BTreeMap<String, String>) -> $crate::application::ports::ControllerResult<()> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one update_application_services) => {
        async fn update_application_services(&self, _: &str, _: &[String]) -> $crate::application::ports::ControllerResult<()> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one get_application_stats) => {
        async fn get_application_stats(&self, _: &str) -> $crate::application::ports::ControllerResult<cfdeploy_common::ApplicationStats> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one get_application_instances) => {
        async fn get_application_instances(&self, _: &str) -> $crate::application::ports::ControllerResult<cfdeploy_common::InstancesInfo> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one get_recent_logs) => {
        async fn get_recent_logs(&self, _: &str) -> $crate::application::ports::ControllerResult<Vec<cfdeploy_common::ApplicationLog>> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one get_services) => {
        async fn get_services(&self) -> $crate::application::ports::ControllerResult<Vec<cfdeploy_common::CloudService>> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one create_service) => {
        async fn create_service(&self, _: &cfdeploy_common::CloudService) -> $crate::application::ports::ControllerResult<()> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one delete_service) => {
        async fn delete_service(&self, _: &str) -> $crate::application::ports::ControllerResult<()> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one get_service_instance) => {
        async fn get_service_instance(&self, _: &str) -> $crate::application::ports::ControllerResult<Option<cfdeploy_common::ServiceInstance>> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one get_routes) => {
        async fn get_routes(&self, _: &str) -> $crate::application::ports::ControllerResult<Vec<cfdeploy_common::CloudRoute>> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one delete_route) => {
        async fn delete_route(&self, _: &str, _: &str) -> $crate::application::ports::ControllerResult<()> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one get_domains) => {
        async fn get_domains(&self) -> $crate::application::ports::ControllerResult<Vec<cfdeploy_common::CloudDomain>> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one get_domains_for_org) => {
        async fn get_domains_for_org(&self, _: &str) -> $crate::application::ports::ControllerResult<Vec<cfdeploy_common::CloudDomain>> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one get_service_offerings) => {
        async fn get_service_offerings(&self) -> $crate::application::ports::ControllerResult<Vec<cfdeploy_common::ServiceOffering>> {
            impl_controller_stubs!(@fail)
        }
    };
    (@one get_ssh_code) => {
        async fn get_ssh_code(&self) -> $crate::application::ports::ControllerResult<String> {
            impl_controller_stubs!(@fail)
        }
    };
}

pub(crate) use impl_controller_stubs;

/// Controller on which every call is unexpected.
pub struct UnreachableController;

impl crate::application::ports::RemoteControlClient for UnreachableController {
    impl_controller_stubs!(
        login,
        get_applications,
        get_application,
        create_application,
        start_application,
        stop_application,
        delete_application,
        update_application_memory,
        update_application_instances,
        update_application_uris,
        update_application_env,
        update_application_services,
        get_application_stats,
        get_application_instances,
        get_recent_logs,
        get_services,
        create_service,
        delete_service,
        get_service_instance,
        get_routes,
        delete_route,
        get_domains,
        get_domains_for_org,
        get_service_offerings,
        get_ssh_code,
    );
}

/// Module store backed by a map.
#[derive(Default)]
pub struct MemoryStore {
    pub modules: RefCell<BTreeMap<String, ApplicationModule>>,
}

impl MemoryStore {
    pub fn with(modules: impl IntoIterator<Item = ApplicationModule>) -> Self {
        Self {
            modules: RefCell::new(
                modules
                    .into_iter()
                    .map(|m| (m.local_id.clone(), m))
                    .collect(),
            ),
        }
    }

    pub fn get(&self, local_id: &str) -> Option<ApplicationModule> {
        self.modules.borrow().get(local_id).cloned()
    }
}

impl LocalModuleStore for MemoryStore {
    fn cloud_module(&self, local_id: &str) -> anyhow::Result<Option<ApplicationModule>> {
        Ok(self.get(local_id))
    }

    fn existing_cloud_module(&self, app_name: &str) -> anyhow::Result<Option<ApplicationModule>> {
        Ok(self
            .modules
            .borrow()
            .values()
            .find(|m| m.deployed_name == app_name)
            .cloned())
    }

    fn save_module(&self, module: &ApplicationModule) -> anyhow::Result<()> {
        self.modules
            .borrow_mut()
            .insert(module.local_id.clone(), module.clone());
        Ok(())
    }

    fn remove_module(&self, local_id: &str) -> anyhow::Result<()> {
        self.modules.borrow_mut().remove(local_id);
        Ok(())
    }
}

/// Records every event, console line, refresh and progress message.
#[derive(Default)]
pub struct Recorder {
    pub events: RefCell<Vec<ServerEvent>>,
    pub console: RefCell<Vec<String>>,
    pub refreshes: RefCell<Vec<String>>,
    pub steps: RefCell<Vec<String>>,
    pub warnings: RefCell<Vec<String>>,
}

impl EventSink for Recorder {
    fn fire_event(&self, event: ServerEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl ConsoleSink for Recorder {
    fn print(&self, _app_name: &str, text: &str) {
        self.console.borrow_mut().push(text.to_string());
    }
}

impl RefreshScheduler for Recorder {
    fn schedule_refresh(&self, local_id: &str) {
        self.refreshes.borrow_mut().push(local_id.to_string());
    }
}

impl ProgressReporter for Recorder {
    fn step(&self, message: &str) {
        self.steps.borrow_mut().push(message.to_string());
    }
    fn success(&self, _message: &str) {}
    fn warn(&self, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }
}
