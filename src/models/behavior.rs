//! # Behavior モジュール
//!
//! エージェント1体分の行動決定（リーダー／フォロワーの状態機械）を提供します。
//!
//! ## リーダー
//!
//! 再計画時刻`next_replan_time`までは前回の方向を維持し、時刻を過ぎたら
//! ポテンシャル場から新しい方向を求めます。候補がゼロベクトルなら
//! 長いクールダウン（既定3秒）を加算し、そうでなければ短い間隔（既定0.5秒）で
//! 再計画します。
//!
//! ## フォロワー
//!
//! リーダーの位置を中心とした半径`orbit_radius`の円周上の点へ向かいます。
//! リーダーが見つからない場合は`Evaluation::LeaderLost`を返し、
//! 継承処理は`SquadController`が行います。

use serde::{Deserialize, Serialize};

use crate::models::common::{Vector2, math_utils};
use crate::models::potential::NormalizePolicy;
use crate::models::world::{WorldQuery, WorldSnapshot};

/// 位相の周期（時刻をこの値で折り返して度として扱う）
const ORBIT_PERIOD: f64 = 360.0;

/// エージェントの役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Leader,
    Follower,
}

/// ホストへ返す移動指示
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// 絶対方向ベクトル
    Direction(Vector2),
    /// 目標地点へ向かう
    SeekTarget(Vector2),
    /// 直前の進行方向を維持
    Hold,
}

/// ナビゲーション定数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub normalize: NormalizePolicy,
    /// 目標追跡中の再計画間隔（秒）
    pub replan_interval_s: f64,
    /// 候補がゼロだった場合のクールダウン（秒）
    pub idle_cooldown_s: f64,
    /// 最初の再計画時刻（秒）
    pub initial_replan_time_s: f64,
    pub initial_direction: Vector2,
    /// フォロワーの周回半径
    pub orbit_radius: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            normalize: NormalizePolicy::UnitVector,
            replan_interval_s: 0.5,
            idle_cooldown_s: 3.0,
            initial_replan_time_s: 5.0,
            initial_direction: Vector2::new(1.0, 1.0),
            orbit_radius: 5.0,
        }
    }
}

/// 分隊メンバー
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: String,
    pub role: Role,
    /// 追従先のリーダーID（リーダー自身はNone）
    pub following_id: Option<String>,
    pub last_direction: Vector2,
    pub next_replan_time: f64,
}

impl Agent {
    pub fn leader(id: String, config: &NavigationConfig) -> Self {
        Self {
            id,
            role: Role::Leader,
            following_id: None,
            last_direction: config.initial_direction,
            next_replan_time: config.initial_replan_time_s,
        }
    }

    pub fn follower(id: String, leader_id: String, config: &NavigationConfig) -> Self {
        Self {
            id,
            role: Role::Follower,
            following_id: Some(leader_id),
            last_direction: config.initial_direction,
            next_replan_time: config.initial_replan_time_s,
        }
    }

    pub fn is_leader(&self) -> bool {
        self.role == Role::Leader
    }
}

/// 1ティックの評価に必要な読み取り専用コンテキスト
pub struct TickContext<'a> {
    pub t: f64,
    pub dt: f64,
    pub world: &'a WorldSnapshot,
    pub query: &'a WorldQuery,
    pub config: &'a NavigationConfig,
}

/// 評価結果
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Intent(Intent),
    /// フォロワーが追従先を見失った（継承が必要）
    LeaderLost,
}

/// 役割に応じてエージェントを1回評価
///
/// 自身がスナップショットに存在しないエージェントは状態を変えず`Hold`を返します。
pub fn evaluate(agent: &mut Agent, ctx: &TickContext<'_>) -> Evaluation {
    let Some(position) = ctx.world.teammate_position(&agent.id) else {
        return Evaluation::Intent(Intent::Hold);
    };

    match agent.role {
        Role::Leader => Evaluation::Intent(lead(agent, position, ctx)),
        Role::Follower => follow(agent, ctx),
    }
}

fn lead(agent: &mut Agent, position: Vector2, ctx: &TickContext<'_>) -> Intent {
    if ctx.t <= agent.next_replan_time {
        return Intent::Direction(agent.last_direction);
    }

    let field = ctx.query.field(ctx.world, ctx.t, ctx.config.normalize);
    let candidate = field.direction(position);

    if candidate.is_zero() {
        agent.next_replan_time += ctx.config.idle_cooldown_s;
    } else {
        agent.last_direction = candidate;
        agent.next_replan_time = ctx.t + ctx.config.replan_interval_s;
    }

    Intent::Direction(agent.last_direction)
}

fn follow(agent: &Agent, ctx: &TickContext<'_>) -> Evaluation {
    let leader_position = agent
        .following_id
        .as_deref()
        .and_then(|id| ctx.world.teammate_position(id));

    match leader_position {
        Some(center) => {
            let target = orbit_point(center, ctx.t, ctx.config.orbit_radius);
            Evaluation::Intent(Intent::SeekTarget(target))
        }
        None => Evaluation::LeaderLost,
    }
}

/// 時刻`t`におけるリーダー周回点
pub fn orbit_point(center: Vector2, t: f64, radius: f64) -> Vector2 {
    let phase = math_utils::deg_to_rad(math_utils::wrap(t, ORBIT_PERIOD));
    center + Vector2::from_polar(radius, phase)
}
