//! UseCase 層
//!
//! セッションループとバスブリッジが使うアプリケーションロジック。

pub mod deliver_to_room;
pub mod handle_inbound_event;
pub mod join_room;
pub mod leave_room;
pub mod list_rooms;
pub mod publish_message;
pub mod relay_bus_message;

pub use deliver_to_room::DeliverToRoomUseCase;
pub use handle_inbound_event::HandleInboundEventUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use list_rooms::ListRoomsUseCase;
pub use publish_message::PublishMessageUseCase;
pub use relay_bus_message::RelayBusMessageUseCase;
