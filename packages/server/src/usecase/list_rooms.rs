//! UseCase: 登録中ルームの一覧（デバッグ用）

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, RegisteredRoom};

/// ルーム一覧取得のユースケース
pub struct ListRoomsUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl ListRoomsUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self) -> Vec<RegisteredRoom> {
        self.registry.rooms().await
    }
}
