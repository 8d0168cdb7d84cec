/// Push channel protocol
///
/// JSON frames exchanged over `/ws`, tagged by `type` in camelCase.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Frames sent by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Binds the connection to a user with an access token
    #[serde(rename_all = "camelCase")]
    Auth { token: String },

    /// Re-evaluates the unseen-activity badge and replies with `activityBadge`
    CheckActivity,

    Ping,
}

/// Frames pushed by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    AuthSuccess { user_id: Uuid },

    #[serde(rename_all = "camelCase")]
    AuthFailed { reason: String },

    /// Sticky badge for the feed tab
    #[serde(rename_all = "camelCase")]
    ActivityBadge { has_unseen: bool },

    #[serde(rename_all = "camelCase")]
    FriendRequestReceived { from_user_id: Uuid, username: String },

    #[serde(rename_all = "camelCase")]
    FriendRequestAccepted { user_id: Uuid, username: String },

    #[serde(rename_all = "camelCase")]
    FriendRemoved { user_id: Uuid },

    #[serde(rename_all = "camelCase")]
    ResponseLiked { response_id: Uuid, liked_by: Uuid, likes: i32 },

    Pong,

    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_auth_deserialize() {
        let json = r#"{"type":"auth","token":"my-jwt-token"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Auth { token } if token == "my-jwt-token"));
    }

    #[test]
    fn test_client_unit_variants_deserialize() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"checkActivity"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::CheckActivity));

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_unknown_client_frame_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"sendMessage"}"#).is_err());
    }

    #[test]
    fn test_activity_badge_serialize() {
        let json = serde_json::to_value(ServerMessage::ActivityBadge { has_unseen: true }).unwrap();
        assert_eq!(json["type"], "activityBadge");
        assert_eq!(json["hasUnseen"], true);
    }

    #[test]
    fn test_friend_request_received_serialize() {
        let from = Uuid::now_v7();
        let json = serde_json::to_value(ServerMessage::FriendRequestReceived {
            from_user_id: from,
            username: "alice".into(),
        })
        .unwrap();

        assert_eq!(json["type"], "friendRequestReceived");
        assert_eq!(json["fromUserId"], from.to_string());
        assert_eq!(json["username"], "alice");
    }
}
