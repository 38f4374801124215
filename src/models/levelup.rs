//! # Levelup モジュール
//!
//! 定期的なレベルアップで「どのヒーローに何を強化するか」を選ぶ戦略を提供します。
//! 選択方針は`ILevelupStrategist`で差し替え可能で、ナビゲーションには影響しません。

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SquadError, SquadResult};
use crate::models::traits::ILevelupStrategist;

/// 強化内容
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelupOption {
    WeaponDamage,
    WeaponCooldown,
    WeaponSize,
    WeaponSpeed,
    WeaponLongevity,
    WeaponRadius,
    PlayerHealth,
    PlayerSpeed,
    PlayerArmor,
}

impl LevelupOption {
    pub const ALL: [LevelupOption; 9] = [
        LevelupOption::WeaponDamage,
        LevelupOption::WeaponCooldown,
        LevelupOption::WeaponSize,
        LevelupOption::WeaponSpeed,
        LevelupOption::WeaponLongevity,
        LevelupOption::WeaponRadius,
        LevelupOption::PlayerHealth,
        LevelupOption::PlayerSpeed,
        LevelupOption::PlayerArmor,
    ];
}

/// レベルアップ時にホストから渡される情報
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LevelupInfo {
    /// 今回到達したレベル
    pub level: u32,
}

/// 選択結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Levelup {
    pub hero: String,
    pub option: LevelupOption,
}

/// 戦略の種類（シナリオ設定用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelupStrategy {
    #[default]
    Random,
    RoundRobin,
}

impl LevelupStrategy {
    /// 1試合分の戦略を作成（乱数源はシードから構築）
    pub fn build(self, seed: u64) -> Box<dyn ILevelupStrategist> {
        match self {
            LevelupStrategy::Random => Box::new(RandomStrategist::new(seed)),
            LevelupStrategy::RoundRobin => Box::new(RoundRobinStrategist::default()),
        }
    }
}

/// ヒーローと強化内容を一様乱数で選ぶ
pub struct RandomStrategist {
    rng: StdRng,
}

impl RandomStrategist {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ILevelupStrategist for RandomStrategist {
    fn levelup(&mut self, t: f64, info: &LevelupInfo, roster: &[String]) -> SquadResult<Levelup> {
        let hero = roster.choose(&mut self.rng).ok_or(SquadError::EmptyRoster)?;
        let option = LevelupOption::ALL[self.rng.gen_range(0..LevelupOption::ALL.len())];

        debug!("レベル{}: {} に {:?} (時刻: {:.1}秒)", info.level, hero, option, t);
        Ok(Levelup {
            hero: hero.clone(),
            option,
        })
    }
}

/// ロスター順・強化内容順に巡回して選ぶ
#[derive(Debug, Default)]
pub struct RoundRobinStrategist {
    next_hero: usize,
    next_option: usize,
}

impl ILevelupStrategist for RoundRobinStrategist {
    fn levelup(&mut self, _t: f64, _info: &LevelupInfo, roster: &[String]) -> SquadResult<Levelup> {
        if roster.is_empty() {
            return Err(SquadError::EmptyRoster);
        }

        let hero = roster[self.next_hero % roster.len()].clone();
        let option = LevelupOption::ALL[self.next_option % LevelupOption::ALL.len()];
        self.next_hero = (self.next_hero + 1) % roster.len();
        if self.next_hero == 0 {
            self.next_option = (self.next_option + 1) % LevelupOption::ALL.len();
        }

        Ok(Levelup { hero, option })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<String> {
        ["alaric", "kaelen", "garron"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_random_strategist_is_reproducible() {
        let mut a = RandomStrategist::new(12);
        let mut b = RandomStrategist::new(12);
        let info = LevelupInfo { level: 2 };
        for _ in 0..20 {
            let x = a.levelup(0.0, &info, &roster()).unwrap();
            let y = b.levelup(0.0, &info, &roster()).unwrap();
            assert_eq!(x, y);
            assert!(roster().contains(&x.hero));
        }
    }

    #[test]
    fn test_empty_roster_is_rejected() {
        let info = LevelupInfo::default();
        assert_eq!(
            RandomStrategist::new(1).levelup(0.0, &info, &[]),
            Err(SquadError::EmptyRoster)
        );
        assert_eq!(
            RoundRobinStrategist::default().levelup(0.0, &info, &[]),
            Err(SquadError::EmptyRoster)
        );
    }

    #[test]
    fn test_round_robin_cycles_heroes_then_options() {
        let mut strategist = LevelupStrategy::RoundRobin.build(0);
        let info = LevelupInfo::default();
        let picks: Vec<Levelup> = (0..4)
            .map(|_| strategist.levelup(0.0, &info, &roster()).unwrap())
            .collect();

        assert_eq!(picks[0].hero, "alaric");
        assert_eq!(picks[1].hero, "kaelen");
        assert_eq!(picks[2].hero, "garron");
        assert_eq!(picks[3].hero, "alaric");
        assert_eq!(picks[0].option, LevelupOption::WeaponDamage);
        assert_eq!(picks[2].option, LevelupOption::WeaponDamage);
        assert_eq!(picks[3].option, LevelupOption::WeaponCooldown);
    }
}
