// 基本的なデータ型と数学ユーティリティ
pub mod common;

// ホスト・レベルアップ戦略のインターフェース（trait）定義
pub mod traits;

// ナビゲーションの中核
pub mod potential;
pub mod world;
pub mod behavior;
pub mod squad;

// レベルアップ選択
pub mod levelup;

// 便利な re-export
pub use common::*;
pub use traits::*;
pub use potential::{NormalizePolicy, Pole, PotentialField};
pub use world::{
    HealingEffect, MonsterGroup, PickupGroup, PickupRule, PickupTable, TeammateInfo, WorldQuery,
    WorldSnapshot,
};
pub use behavior::{Agent, Intent, NavigationConfig, Role};
pub use squad::{SquadController, SuccessionEvent};
pub use levelup::{
    Levelup, LevelupInfo, LevelupOption, LevelupStrategy, RandomStrategist, RoundRobinStrategist,
};
