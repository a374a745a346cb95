//! Server state shared by all handlers.

use std::sync::Arc;

use crate::{
    domain::AdmissionCheck,
    usecase::{
        HandleInboundEventUseCase, JoinRoomUseCase, LeaveRoomUseCase, ListRoomsUseCase,
        PublishMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// AdmissionCheck（接続前のトークン検証）
    pub admission: Arc<dyn AdmissionCheck>,
    /// JoinRoomUseCase（join ハンドシェイク）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// HandleInboundEventUseCase（受信イベントの処理）
    pub handle_inbound_event_usecase: Arc<HandleInboundEventUseCase>,
    /// LeaveRoomUseCase（セッション終了時の登録解除）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// ListRoomsUseCase（登録中ルームの一覧）
    pub list_rooms_usecase: Arc<ListRoomsUseCase>,
    /// PublishMessageUseCase（HTTP 経由の発行）
    pub publish_message_usecase: Arc<PublishMessageUseCase>,
}
