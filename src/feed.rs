use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::broker::Broker;
use crate::rabbitmq::{AmqpClient, Result};

/// Publishes each line of `reader` as a message of `message_type` until the input ends
/// or `shutdown` resolves. Stops at the first read or publish error.
///
/// Returns the number of messages published.
pub async fn publish_lines<C, R, S>(
    broker: &Broker<C>,
    message_type: &str,
    reader: R,
    shutdown: S,
) -> Result<usize>
where
    C: AmqpClient,
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    let mut lines = reader.lines();
    tokio::pin!(shutdown);

    let mut published = 0usize;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                broker.publish(message_type, line).await?;
                published += 1;
            }
        }
    }

    info!(published, message_type = %message_type, "Done publishing");
    Ok(published)
}

/// Runs [`publish_lines`] and closes the broker afterwards, whatever the outcome.
/// A publishing error takes precedence over a close error.
pub async fn publish_lines_then_close<C, R, S>(
    broker: &mut Broker<C>,
    message_type: &str,
    reader: R,
    shutdown: S,
) -> Result<usize>
where
    C: AmqpClient,
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    let outcome = publish_lines(broker, message_type, reader, shutdown).await;
    let closed = broker.close().await;

    match (outcome, closed) {
        (Err(e), Err(close_err)) => {
            warn!("Close failed after publishing error: {}", close_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Ok(published), Ok(())) => Ok(published),
    }
}
