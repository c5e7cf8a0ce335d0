use std::any::Any;

use diesel::SqliteConnection;
use log::error;
use tokio::sync::{mpsc, oneshot};

use super::DbPool;
use crate::errors::StorageError;
use finboard_core::errors::{DatabaseError, Error, Result};

// A write job runs on the actor's connection and returns core::Result,
// which is what repositories hand back to callers.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type AnyBox = Box<dyn Any + Send + 'static>;
type Envelope = (Job<AnyBox>, oneshot::Sender<Result<AnyBox>>);

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<Envelope>,
}

impl WriteHandle {
    /// Executes `job` on the writer's dedicated connection inside an
    /// immediate transaction. Jobs run one at a time, in submission order.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as AnyBox)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_stopped())?;

        let boxed = ret_rx.await.map_err(|_| writer_stopped())??;
        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| Error::Unexpected("Writer actor returned an unexpected type".to_string()))
    }
}

fn writer_stopped() -> Error {
    DatabaseError::Internal("Writer actor is not running".to_string()).into()
}

/// Spawns the single database writer.
///
/// The actor owns one pooled connection for its lifetime and stops when
/// every [`WriteHandle`] has been dropped. If no connection can be acquired,
/// each submitted job fails with `ConnectionFailed`.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<Envelope>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                let message = e.to_string();
                error!("Writer actor could not acquire a connection: {}", message);
                while let Some((_, reply_tx)) = rx.recv().await {
                    let _ = reply_tx.send(Err(DatabaseError::ConnectionFailed(message.clone()).into()));
                }
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<AnyBox> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(Error::from);

            // The caller may have gone away; nothing to do then.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
