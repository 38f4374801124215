use crate::error::SquadResult;
use crate::models::behavior::Intent;
use crate::models::levelup::{Levelup, LevelupInfo};
use crate::models::world::WorldSnapshot;

/// ワールドスナップショットの提供者（ホスト側）
pub trait ISnapshotProvider {
    /// 時刻`t`のスナップショットを作成
    fn snapshot(&self, t: f64) -> WorldSnapshot;

    /// 移動指示をワールドに反映
    fn apply_intents(&mut self, intents: &[(String, Intent)], t: f64, dt: f64);
}

/// レベルアップ選択のインターフェース
pub trait ILevelupStrategist {
    /// ヒーローとアップグレード内容を1組選ぶ
    fn levelup(&mut self, t: f64, info: &LevelupInfo, roster: &[String]) -> SquadResult<Levelup>;
}
