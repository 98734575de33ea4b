use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, MultiplexedConnection};
use redis::{Client, RedisError};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::application::ports::{QueueStore, QueueStoreError};

/// Redis lists as the shared FIFO: `RPUSH` to enqueue, `BLPOP` with a zero
/// timeout to wait.
///
/// `BLPOP` parks the whole connection it runs on, so blocking pops never share
/// the command connection; each one checks out a dedicated connection from a
/// small idle pool.
pub struct RedisQueueStore {
    client: Client,
    commands: ConnectionManager,
    blocking_pool: Mutex<Vec<MultiplexedConnection>>,
}

impl RedisQueueStore {
    #[instrument(skip(url))]
    pub async fn connect(url: &str) -> Result<Self, QueueStoreError> {
        let client = Client::open(url).map_err(connection_error)?;

        let mut retries = 5;
        let mut delay = Duration::from_millis(500);
        let commands = loop {
            match ConnectionManager::new(client.clone()).await {
                Ok(manager) => break manager,
                Err(e) if retries > 0 => {
                    retries -= 1;
                    warn!(
                        error = %e,
                        retries_left = retries,
                        delay_ms = delay.as_millis(),
                        "Redis connection failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => return Err(connection_error(e)),
            }
        };

        info!("Redis queue store connected");
        Ok(Self {
            client,
            commands,
            blocking_pool: Mutex::new(Vec::new()),
        })
    }

    async fn checkout_blocking(&self) -> Result<MultiplexedConnection, QueueStoreError> {
        if let Some(conn) = self.blocking_pool.lock().await.pop() {
            return Ok(conn);
        }
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(connection_error)
    }

    async fn checkin_blocking(&self, conn: MultiplexedConnection) {
        self.blocking_pool.lock().await.push(conn);
    }
}

#[async_trait]
impl QueueStore for RedisQueueStore {
    async fn push(&self, key: &str, payload: String) -> Result<(), QueueStoreError> {
        let mut conn = self.commands.clone();
        let _: i64 = redis::cmd("RPUSH")
            .arg(key)
            .arg(payload)
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(())
    }

    async fn push_with_ttl(
        &self,
        key: &str,
        payload: String,
        ttl: Duration,
    ) -> Result<(), QueueStoreError> {
        let mut conn = self.commands.clone();
        let ttl_secs = ttl.as_secs().max(1);
        let _: () = redis::pipe()
            .atomic()
            .cmd("RPUSH")
            .arg(key)
            .arg(payload)
            .ignore()
            .cmd("EXPIRE")
            .arg(key)
            .arg(ttl_secs)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(())
    }

    async fn len(&self, key: &str) -> Result<usize, QueueStoreError> {
        let mut conn = self.commands.clone();
        let len: usize = redis::cmd("LLEN")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(len)
    }

    async fn pop_blocking(&self, key: &str) -> Result<String, QueueStoreError> {
        let mut conn = self.checkout_blocking().await?;
        let popped: Result<Option<(String, String)>, RedisError> = redis::cmd("BLPOP")
            .arg(key)
            .arg(0)
            .query_async(&mut conn)
            .await;

        match popped {
            Ok(Some((_, payload))) => {
                self.checkin_blocking(conn).await;
                Ok(payload)
            }
            Ok(None) => {
                self.checkin_blocking(conn).await;
                Err(QueueStoreError::CommandFailed(
                    "BLPOP returned no element without a timeout".to_string(),
                ))
            }
            Err(e) => Err(command_error(e)),
        }
    }

    async fn ping(&self) -> Result<(), QueueStoreError> {
        let mut conn = self.commands.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(())
    }
}

fn connection_error(e: RedisError) -> QueueStoreError {
    QueueStoreError::ConnectionFailed(e.to_string())
}

fn command_error(e: RedisError) -> QueueStoreError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
        QueueStoreError::ConnectionFailed(e.to_string())
    } else {
        QueueStoreError::CommandFailed(e.to_string())
    }
}
