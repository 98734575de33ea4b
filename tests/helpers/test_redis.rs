use parley::infrastructure::queue::RedisQueueStore;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

pub struct TestRedis {
    pub url: String,
    pub store: RedisQueueStore,
    _container: ContainerAsync<GenericImage>,
}

impl TestRedis {
    pub async fn new() -> Self {
        let container = GenericImage::new("redis", "7-alpine")
            .with_exposed_port(ContainerPort::Tcp(6379))
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
            .start()
            .await
            .expect("Failed to start Redis container");

        let host_port = container
            .get_host_port_ipv4(6379)
            .await
            .expect("Failed to get Redis port");

        let url = format!("redis://127.0.0.1:{}", host_port);
        let store = RedisQueueStore::connect(&url)
            .await
            .expect("Failed to connect to Redis");

        Self {
            url,
            store,
            _container: container,
        }
    }
}
