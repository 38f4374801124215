//! # squadsim
//!
//! 連続2次元空間を移動する小規模分隊の操舵判断ライブラリです。
//!
//! 毎ティック、ワールドスナップショットから引力極・斥力極を抽出して
//! ポテンシャル場を構成し、リーダーは場の勾配に従って進路を選び、
//! フォロワーはリーダーの周囲を周回します。リーダーを見失った場合は
//! 最初に気付いたフォロワーがリーダーを継承します。

pub mod error;
pub mod logging;
pub mod models;
pub mod scenario;
pub mod simulation;
