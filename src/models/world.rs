//! # World モジュール
//!
//! ホストから毎ティック渡されるワールドスナップショットと、
//! スナップショットから極（Pole）を抽出する`WorldQuery`を提供します。
//!
//! ## 抽出ルール
//!
//! - **斥力極**: 敵1体につき1つ。強さは`attack * speed`、幅は敵の半径
//! - **引力極**: 回復エフェクト（分隊に負傷者がいる場合のみ）を先頭に、
//!   続いてピックアップをテーブル順に並べる
//!
//! テーブルに存在しないピックアップ種別は無視されます。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::common::Vector2;
use crate::models::potential::{NormalizePolicy, Pole, PotentialField};

/// 同一種別の敵の集合（インスタンスごとの配列）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonsterGroup {
    pub positions: Vec<Vector2>,
    pub attacks: Vec<f64>,
    pub speeds: Vec<f64>,
    pub radii: Vec<f64>,
}

impl MonsterGroup {
    /// 全インスタンスが同じ能力値を持つグループを作成
    pub fn uniform(positions: Vec<Vector2>, attack: f64, speed: f64, radius: f64) -> Self {
        let n = positions.len();
        Self {
            positions,
            attacks: vec![attack; n],
            speeds: vec![speed; n],
            radii: vec![radius; n],
        }
    }
}

/// 味方ヒーローの状態
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeammateInfo {
    pub position: Vector2,
    pub health: f64,
    pub max_health: f64,
}

/// 同一種別のピックアップの集合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickupGroup {
    pub positions: Vec<Vector2>,
}

/// 一時的な回復エフェクト（回復弾など）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealingEffect {
    pub position: Vector2,
    /// 消滅時刻（秒）
    pub expires_at: f64,
    /// 残り回復量
    pub heal: f64,
    pub radius: f64,
}

/// 1ティック分のワールドスナップショット
#[derive(Debug, Clone, Default)]
pub struct WorldSnapshot {
    pub monsters: BTreeMap<String, MonsterGroup>,
    pub teammates: BTreeMap<String, TeammateInfo>,
    pub pickups: BTreeMap<String, PickupGroup>,
    pub healing_effects: Vec<HealingEffect>,
}

impl WorldSnapshot {
    /// 味方の現在位置（スナップショットに存在しなければNone）
    pub fn teammate_position(&self, id: &str) -> Option<Vector2> {
        self.teammates.get(id).map(|info| info.position)
    }

    /// 生存している味方の中に最大体力未満の者がいるか
    pub fn squad_needs_healing(&self) -> bool {
        self.teammates
            .values()
            .any(|info| info.health > 0.0 && info.health < info.max_health)
    }
}

/// ピックアップ種別ごとの引力設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupRule {
    pub kind: String,
    pub strength: f64,
    pub sigma: f64,
    /// trueの場合、分隊に負傷者がいない間は強さが0になる
    #[serde(default)]
    pub health_scaled: bool,
}

/// ピックアップの引力テーブル（順序が引力極の並び順になる）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickupTable(pub Vec<PickupRule>);

impl Default for PickupTable {
    fn default() -> Self {
        Self(vec![
            PickupRule {
                kind: "chicken".to_string(),
                strength: 10.0,
                sigma: 100.0,
                health_scaled: true,
            },
            PickupRule {
                kind: "treasure".to_string(),
                strength: 130.0,
                sigma: 100.0,
                health_scaled: false,
            },
        ])
    }
}

/// スナップショットから極を抽出する
#[derive(Debug, Clone, Default)]
pub struct WorldQuery {
    pub pickups: PickupTable,
}

impl WorldQuery {
    pub fn new(pickups: PickupTable) -> Self {
        Self { pickups }
    }

    /// 敵ごとの斥力極
    pub fn repulse_poles(&self, snapshot: &WorldSnapshot) -> Vec<Pole> {
        let mut poles = Vec::new();
        for (kind, group) in &snapshot.monsters {
            let instances = group
                .positions
                .iter()
                .zip(&group.attacks)
                .zip(&group.speeds)
                .zip(&group.radii);
            for (((position, attack), speed), radius) in instances {
                push_pole(&mut poles, kind, *position, attack * speed, *radius);
            }
        }
        poles
    }

    /// 回復エフェクトとピックアップの引力極
    pub fn attract_poles(&self, snapshot: &WorldSnapshot, now: f64) -> Vec<Pole> {
        let needs_healing = snapshot.squad_needs_healing();
        let health_scale = if needs_healing { 1.0 } else { 0.0 };
        let mut poles = Vec::new();

        if needs_healing {
            for effect in &snapshot.healing_effects {
                let strength = (effect.expires_at - now) * effect.heal;
                if strength <= 0.0 {
                    continue;
                }
                push_pole(&mut poles, "healing", effect.position, strength, effect.radius);
            }
        }

        for rule in &self.pickups.0 {
            let Some(group) = snapshot.pickups.get(&rule.kind) else {
                continue;
            };
            let strength = if rule.health_scaled {
                rule.strength * health_scale
            } else {
                rule.strength
            };
            // 強さ0の極は意図的に除外する。残すと先頭の引力極を占有し、
            // 後続のピックアップ（宝箱など）への誘導が効かなくなる。
            if strength == 0.0 {
                continue;
            }
            for position in &group.positions {
                push_pole(&mut poles, &rule.kind, *position, strength, rule.sigma);
            }
        }

        poles
    }

    /// このティックのポテンシャル場を構築
    pub fn field(
        &self,
        snapshot: &WorldSnapshot,
        now: f64,
        policy: NormalizePolicy,
    ) -> PotentialField {
        PotentialField::new(
            self.attract_poles(snapshot, now),
            self.repulse_poles(snapshot),
            policy,
        )
    }
}

fn push_pole(poles: &mut Vec<Pole>, kind: &str, position: Vector2, strength: f64, sigma: f64) {
    match Pole::new(position, strength, sigma) {
        Ok(pole) => poles.push(pole),
        Err(e) => warn!(
            "{} の極をスキップしました ({:.1}, {:.1}): {}",
            kind, position.x, position.y, e
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teammate(x: f64, y: f64, health: f64, max_health: f64) -> TeammateInfo {
        TeammateInfo {
            position: Vector2::new(x, y),
            health,
            max_health,
        }
    }

    fn snapshot_with_pickups() -> WorldSnapshot {
        let mut snapshot = WorldSnapshot::default();
        snapshot.pickups.insert(
            "chicken".to_string(),
            PickupGroup { positions: vec![Vector2::new(1.0, 1.0)] },
        );
        snapshot.pickups.insert(
            "treasure".to_string(),
            PickupGroup { positions: vec![Vector2::new(2.0, 2.0), Vector2::new(3.0, 3.0)] },
        );
        snapshot.pickups.insert(
            "mystery".to_string(),
            PickupGroup { positions: vec![Vector2::new(9.0, 9.0)] },
        );
        snapshot
    }

    #[test]
    fn test_empty_snapshot_yields_no_poles() {
        let query = WorldQuery::default();
        let snapshot = WorldSnapshot::default();
        assert!(query.repulse_poles(&snapshot).is_empty());
        assert!(query.attract_poles(&snapshot, 0.0).is_empty());
        assert!(query.field(&snapshot, 0.0, NormalizePolicy::UnitVector).is_empty());
    }

    #[test]
    fn test_monster_threat_is_attack_times_speed() {
        let mut snapshot = WorldSnapshot::default();
        snapshot.monsters.insert(
            "bat".to_string(),
            MonsterGroup {
                positions: vec![Vector2::new(1.0, 0.0), Vector2::new(2.0, 0.0)],
                attacks: vec![2.0, 3.0],
                speeds: vec![5.0, 7.0],
                radii: vec![10.0, 0.0],
            },
        );
        snapshot.monsters.insert(
            "ghost".to_string(),
            MonsterGroup::uniform(vec![Vector2::new(0.0, 4.0)], 1.0, 1.5, 8.0),
        );

        let poles = WorldQuery::default().repulse_poles(&snapshot);
        // 半径0のインスタンスはスキップされる
        assert_eq!(poles.len(), 2);
        assert_eq!(poles[0].strength(), 10.0);
        assert_eq!(poles[0].sigma(), 10.0);
        assert_eq!(poles[1].strength(), 1.5);
        assert_eq!(poles[1].position(), Vector2::new(0.0, 4.0));
    }

    #[test]
    fn test_healthy_squad_skips_health_scaled_pickups() {
        let mut snapshot = snapshot_with_pickups();
        snapshot.teammates.insert("a".to_string(), teammate(0.0, 0.0, 100.0, 100.0));
        snapshot.healing_effects.push(HealingEffect {
            position: Vector2::new(5.0, 5.0),
            expires_at: 10.0,
            heal: 3.0,
            radius: 20.0,
        });

        let poles = WorldQuery::default().attract_poles(&snapshot, 0.0);
        assert_eq!(poles.len(), 2);
        assert!(poles.iter().all(|p| p.strength() == 130.0));
    }

    #[test]
    fn test_injured_squad_prefers_healing_effects() {
        let mut snapshot = snapshot_with_pickups();
        snapshot.teammates.insert("a".to_string(), teammate(0.0, 0.0, 40.0, 100.0));
        snapshot.healing_effects.push(HealingEffect {
            position: Vector2::new(5.0, 5.0),
            expires_at: 10.0,
            heal: 3.0,
            radius: 20.0,
        });
        snapshot.healing_effects.push(HealingEffect {
            position: Vector2::new(6.0, 6.0),
            expires_at: 2.0,
            heal: 3.0,
            radius: 20.0,
        });

        let poles = WorldQuery::default().attract_poles(&snapshot, 4.0);
        // 期限切れのエフェクトは除外、回復 → chicken → treasure の順
        assert_eq!(poles.len(), 4);
        assert_eq!(poles[0].strength(), 18.0);
        assert_eq!(poles[0].sigma(), 20.0);
        assert_eq!(poles[1].strength(), 10.0);
        assert_eq!(poles[2].strength(), 130.0);
    }

    #[test]
    fn test_dead_teammate_does_not_count_as_injured() {
        let mut snapshot = WorldSnapshot::default();
        snapshot.teammates.insert("a".to_string(), teammate(0.0, 0.0, 0.0, 100.0));
        assert!(!snapshot.squad_needs_healing());
        snapshot.teammates.insert("b".to_string(), teammate(0.0, 0.0, 99.0, 100.0));
        assert!(snapshot.squad_needs_healing());
    }
}
