//! Test doubles for the adapter and the store

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adapter_models::{
    DesiredState, RemoteService, RemoteServiceStatus, ServiceDefinition, ServiceState,
};
use async_trait::async_trait;
use serde_json::{Map, Value};

use stackman::adapter::OrchestratorClient;
use stackman::deploy::fanout::FanoutOptions;
use stackman::deploy::DeploymentManager;
use stackman::errors::{AdapterError, RemoteFailure, StoreError};
use stackman::models::deployment::Deployment;
use stackman::storage::{DeploymentStore, MemoryStore};
use stackman::utils::CooldownOptions;

pub const TEMPLATE: &str = r#"
name: wordpress
images:
  - name: db
    source: mysql:5.6
    environment:
      MYSQL_ROOT_PASSWORD: secret
    ports:
      - container_port: 3306
        host_port: 3306
        proto: TCP
  - name: wp
    source: wordpress:latest
    links:
      - service: db
        alias: mysql
    ports:
      - container_port: 80
        host_port: 8080
    volumes_from:
      - service: data
  - name: data
    source: busybox
    volumes:
      - container_path: /var/lib/mysql
        host_path: /srv/mysql
"#;

fn rejected() -> RemoteFailure {
    RemoteFailure::Rejected {
        status: 500,
        message: "boom".to_string(),
    }
}

/// In-memory orchestrator with call counters and scripted failures
#[derive(Default)]
pub struct FakeOrchestrator {
    services: Mutex<Vec<(String, ServiceState)>>,
    next_id: AtomicUsize,

    pub create_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,

    pub fail_create: AtomicBool,
    /// Return one service fewer than requested
    pub short_create: AtomicBool,
    /// Return the last service without an id
    pub drop_last_id: AtomicBool,
    pub failing_updates: Mutex<HashSet<String>>,
    pub failing_deletes: Mutex<HashSet<String>>,
    /// Remaining timeouts to report per service on get
    pub get_timeouts: Mutex<HashMap<String, u32>>,
}

impl FakeOrchestrator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ids(&self) -> Vec<String> {
        let services = self.services.lock().unwrap();
        services.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn state_of(&self, id: &str) -> Option<ServiceState> {
        let services = self.services.lock().unwrap();
        services
            .iter()
            .find(|(sid, _)| sid == id)
            .map(|(_, state)| state.clone())
    }

    pub fn set_state(&self, id: &str, state: ServiceState) {
        let mut services = self.services.lock().unwrap();
        if let Some(entry) = services.iter_mut().find(|(sid, _)| sid == id) {
            entry.1 = state;
        }
    }

    /// Drop a service behind the manager's back
    pub fn forget(&self, id: &str) {
        self.services.lock().unwrap().retain(|(sid, _)| sid != id);
    }

    pub fn fail_delete_of(&self, id: &str) {
        self.failing_deletes.lock().unwrap().insert(id.to_string());
    }

    pub fn fail_update_of(&self, id: &str) {
        self.failing_updates.lock().unwrap().insert(id.to_string());
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrchestratorClient for FakeOrchestrator {
    async fn create_services(
        &self,
        services: &[ServiceDefinition],
    ) -> Result<Vec<RemoteService>, AdapterError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AdapterError::Create(rejected()));
        }

        let mut created = Vec::new();
        let mut stored = self.services.lock().unwrap();
        for service in services {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            let name = service.name.as_ref().and_then(Value::as_str).unwrap_or("svc");
            let id = format!("{}-{}", name, n);
            stored.push((id.clone(), ServiceState::Started));

            let mut extra = Map::new();
            extra.insert(
                "name".to_string(),
                service.name.clone().unwrap_or(Value::Null),
            );
            created.push(RemoteService {
                id: Some(id),
                extra,
            });
        }

        if self.short_create.load(Ordering::SeqCst) {
            created.pop();
        }
        if self.drop_last_id.load(Ordering::SeqCst) {
            if let Some(last) = created.last_mut() {
                last.id = None;
            }
        }
        Ok(created)
    }

    async fn get_service(&self, id: &str) -> Result<RemoteServiceStatus, AdapterError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);

        {
            let mut timeouts = self.get_timeouts.lock().unwrap();
            if let Some(remaining) = timeouts.get_mut(id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(AdapterError::Fetch {
                        id: id.to_string(),
                        source: RemoteFailure::Timeout,
                    });
                }
            }
        }

        self.state_of(id)
            .map(|state| RemoteServiceStatus::new(id, state))
            .ok_or_else(|| AdapterError::NotFound(id.to_string()))
    }

    async fn update_service(
        &self,
        id: &str,
        desired_state: DesiredState,
    ) -> Result<(), AdapterError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_updates.lock().unwrap().contains(id) {
            return Err(AdapterError::Update {
                id: id.to_string(),
                source: rejected(),
            });
        }
        if self.state_of(id).is_none() {
            return Err(AdapterError::NotFound(id.to_string()));
        }

        let state = match desired_state {
            DesiredState::Started => ServiceState::Started,
            DesiredState::Stopped => ServiceState::Stopped,
        };
        self.set_state(id, state);
        Ok(())
    }

    async fn delete_service(&self, id: &str) -> Result<(), AdapterError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_deletes.lock().unwrap().contains(id) {
            return Err(AdapterError::Delete {
                id: id.to_string(),
                source: rejected(),
            });
        }

        let mut services = self.services.lock().unwrap();
        let before = services.len();
        services.retain(|(sid, _)| sid != id);
        if services.len() == before {
            return Err(AdapterError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Store whose writes always fail
#[derive(Default)]
pub struct ReadOnlyStore;

#[async_trait]
impl DeploymentStore for ReadOnlyStore {
    async fn save(&self, _deployment: &Deployment) -> Result<(), StoreError> {
        Err(StoreError::Backend("read-only".to_string()))
    }

    async fn load(&self, _id: &str) -> Result<Option<Deployment>, StoreError> {
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<Deployment>, StoreError> {
        Ok(Vec::new())
    }

    async fn remove(&self, _id: &str) -> Result<bool, StoreError> {
        Err(StoreError::Backend("read-only".to_string()))
    }
}

pub fn fast_options() -> FanoutOptions {
    FanoutOptions {
        max_concurrency: 4,
        max_attempts: 3,
        cooldown: CooldownOptions {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            multiplier: 2.0,
        },
    }
}

pub fn manager_with(
    adapter: Arc<FakeOrchestrator>,
    store: Arc<dyn DeploymentStore>,
) -> DeploymentManager {
    DeploymentManager::new(adapter, store).with_options(fast_options())
}

pub fn setup() -> (Arc<FakeOrchestrator>, MemoryStore, DeploymentManager) {
    let adapter = FakeOrchestrator::new();
    let store = MemoryStore::new();
    let manager = manager_with(adapter.clone(), Arc::new(store.clone()));
    (adapter, store, manager)
}
