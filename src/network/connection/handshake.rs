//! Banner, username prompt and username intake.

use chatmesh_proto::{LineCodec, PeerFrame, USERNAME_PROMPT, banner};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;

use crate::error::SessionError;

/// Greet the client and settle its username.
///
/// The banner and prompt are always sent, even when the username arrived
/// early, so every client sees the same opening.
pub(super) async fn perform<S>(
    framed: &mut Framed<S, LineCodec>,
    node_name: &str,
    sniffed: Option<String>,
) -> Result<String, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    framed.feed(banner(node_name)).await?;
    framed.send(USERNAME_PROMPT).await?;

    let username = match sniffed {
        Some(line) => line,
        None => match framed.next().await {
            Some(Ok(line)) => line,
            Some(Err(e)) => return Err(e.into()),
            None => return Err(SessionError::ClosedDuringHandshake),
        },
    };

    validate_username(&username)?;
    Ok(username)
}

/// A username is accepted verbatim unless it is blank or would read as a
/// peer frame on the wire.
pub fn validate_username(username: &str) -> Result<(), SessionError> {
    if username.trim().is_empty() {
        return Err(SessionError::EmptyUsername);
    }
    if PeerFrame::is_peer_frame(username) {
        return Err(SessionError::ReservedUsername(username.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ana").is_ok());
        assert!(validate_username(" ana maría ").is_ok());
        assert!(matches!(validate_username(""), Err(SessionError::EmptyUsername)));
        assert!(matches!(validate_username(" \t"), Err(SessionError::EmptyUsername)));
        assert!(matches!(
            validate_username("SYNC_REQUEST"),
            Err(SessionError::ReservedUsername(_))
        ));
        assert!(matches!(
            validate_username("REPLICATE:x"),
            Err(SessionError::ReservedUsername(_))
        ));
    }
}
