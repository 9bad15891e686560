use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rgwuser_admin::{AdminClientFactory, AdminError, DynAdminApi, EndpointContext};

use crate::gateway::InMemoryGateway;

/// Hands out the same in-memory gateway for every endpoint and remembers
/// which endpoints were requested.
#[derive(Debug)]
pub struct InMemoryGatewayFactory {
    gateway: Arc<InMemoryGateway>,
    requested: Mutex<Vec<EndpointContext>>,
}

impl InMemoryGatewayFactory {
    pub fn new(gateway: Arc<InMemoryGateway>) -> Self {
        Self {
            gateway,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<EndpointContext> {
        self.requests().clone()
    }

    fn requests(&self) -> MutexGuard<'_, Vec<EndpointContext>> {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AdminClientFactory for InMemoryGatewayFactory {
    fn build(&self, context: &EndpointContext) -> Result<DynAdminApi, AdminError> {
        self.requests().push(context.clone());
        let admin: DynAdminApi = self.gateway.clone();
        Ok(admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(endpoint: &str) -> EndpointContext {
        EndpointContext {
            namespace: "rook-ceph".into(),
            store: "my-store".into(),
            endpoint: endpoint.into(),
            access_key: "access".into(),
            secret_key: "secret".into(),
        }
    }

    #[test]
    fn test_records_requests_after_poisoned_lock() {
        let factory = Arc::new(InMemoryGatewayFactory::new(Arc::new(InMemoryGateway::new())));
        factory.build(&context("http://a:80")).unwrap();

        let poisoner = factory.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.requested.lock().unwrap();
            panic!("poison the request log");
        })
        .join();
        assert!(factory.requested.is_poisoned());

        factory.build(&context("http://b:80")).unwrap();
        let endpoints: Vec<_> = factory.requested().into_iter().map(|c| c.endpoint).collect();
        assert_eq!(endpoints, vec!["http://a:80", "http://b:80"]);
    }
}
