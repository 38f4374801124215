//! # Simulation モジュール
//!
//! シナリオを固定時間刻みで再生し、分隊の操舵判断を駆動するホスト側の
//! シミュレーションエンジンを提供します。
//!
//! ## シミュレーション処理順序
//!
//! 各時間刻みにおいて、以下の順序で処理が実行されます：
//!
//! 1. **スナップショット作成**: 離脱済みヒーローを除いた現在のワールド
//! 2. **分隊判断**: `SquadController::tick`で全エージェントの移動指示を計算
//! 3. **移動反映**: 移動指示に従ってヒーローを移動
//! 4. **レベルアップ**: 一定間隔で強化対象と内容を選択
//!
//! ## 使用例
//!
//! ```ignore
//! use squadsim::scenario::ScenarioConfig;
//! use squadsim::simulation::SimulationEngine;
//!
//! let config = ScenarioConfig::from_file("scenarios/scenario_basic.yaml")?;
//! let mut engine = SimulationEngine::new(config, 1)?;
//! let report = engine.run();
//! ```

use std::collections::BTreeMap;

use tracing::{debug, info, trace, warn};

use crate::error::ScenarioError;
use crate::models::*;
use crate::scenario::ScenarioConfig;

/// ホストが保持するヒーローの状態
#[derive(Debug, Clone)]
pub struct HeroState {
    pub id: String,
    pub position: Vector2,
    pub health: f64,
    pub max_health: f64,
    /// この時刻以降はスナップショットに現れない
    pub departs_at: Option<f64>,
}

impl HeroState {
    pub fn is_present(&self, t: f64) -> bool {
        self.departs_at.is_none_or(|d| t < d)
    }
}

/// シナリオから構築される簡易ワールド
#[derive(Debug, Clone)]
pub struct ScenarioWorld {
    pub heroes: Vec<HeroState>,
    pub monsters: BTreeMap<String, MonsterGroup>,
    pub pickups: BTreeMap<String, PickupGroup>,
    pub healing_effects: Vec<HealingEffect>,
    pub hero_speed: f64,
}

impl ScenarioWorld {
    pub fn from_scenario(scenario: &ScenarioConfig) -> Self {
        let heroes = scenario
            .squad
            .roster
            .iter()
            .map(|hero| HeroState {
                id: hero.id.clone(),
                position: Vector2::new(hero.x, hero.y),
                health: hero.health,
                max_health: hero.max_health,
                departs_at: scenario
                    .departures
                    .iter()
                    .filter(|d| d.hero == hero.id)
                    .map(|d| d.time_s)
                    .reduce(f64::min),
            })
            .collect();

        let mut monsters: BTreeMap<String, MonsterGroup> = BTreeMap::new();
        for config in &scenario.monsters {
            let group = monsters.entry(config.kind.clone()).or_default();
            for position in &config.positions {
                group.positions.push(*position);
                group.attacks.push(config.attack);
                group.speeds.push(config.speed);
                group.radii.push(config.radius);
            }
        }

        let mut pickups: BTreeMap<String, PickupGroup> = BTreeMap::new();
        for config in &scenario.pickup_spawns {
            pickups
                .entry(config.kind.clone())
                .or_default()
                .positions
                .extend(config.positions.iter().copied());
        }

        let healing_effects = scenario
            .healing_effects
            .iter()
            .map(|e| HealingEffect {
                position: Vector2::new(e.x, e.y),
                expires_at: e.expires_at_s,
                heal: e.heal,
                radius: e.radius,
            })
            .collect();

        Self {
            heroes,
            monsters,
            pickups,
            healing_effects,
            hero_speed: scenario.sim.hero_speed,
        }
    }

    pub fn hero(&self, id: &str) -> Option<&HeroState> {
        self.heroes.iter().find(|h| h.id == id)
    }

    /// 時刻`t`に存在するヒーローのID（編成順）
    pub fn present_heroes(&self, t: f64) -> Vec<String> {
        self.heroes
            .iter()
            .filter(|h| h.is_present(t))
            .map(|h| h.id.clone())
            .collect()
    }
}

impl ISnapshotProvider for ScenarioWorld {
    fn snapshot(&self, t: f64) -> WorldSnapshot {
        let teammates = self
            .heroes
            .iter()
            .filter(|h| h.is_present(t))
            .map(|h| {
                (
                    h.id.clone(),
                    TeammateInfo {
                        position: h.position,
                        health: h.health,
                        max_health: h.max_health,
                    },
                )
            })
            .collect();

        WorldSnapshot {
            monsters: self.monsters.clone(),
            teammates,
            pickups: self.pickups.clone(),
            healing_effects: self
                .healing_effects
                .iter()
                .filter(|e| e.expires_at > t)
                .copied()
                .collect(),
        }
    }

    fn apply_intents(&mut self, intents: &[(String, Intent)], t: f64, dt: f64) {
        let step = self.hero_speed * dt;
        for (id, intent) in intents {
            let Some(hero) = self.heroes.iter_mut().find(|h| &h.id == id) else {
                continue;
            };
            if !hero.is_present(t) {
                continue;
            }

            match intent {
                Intent::Direction(direction) => {
                    hero.position = hero.position + direction.normalize() * step;
                }
                Intent::SeekTarget(target) => {
                    let offset = *target - hero.position;
                    let distance = offset.length();
                    if distance <= step {
                        hero.position = *target;
                    } else {
                        hero.position = hero.position + offset.normalize() * step;
                    }
                }
                Intent::Hold => {}
            }
        }
    }
}

/// 実行結果の統計
#[derive(Debug, Clone, Default)]
pub struct SimulationReport {
    pub steps: u64,
    pub final_time: f64,
    pub successions: Vec<SuccessionEvent>,
    pub levelups: Vec<Levelup>,
    pub final_leader: String,
}

pub struct SimulationEngine {
    pub current_time: f64,
    pub dt: f64,
    pub max_time: f64,
    pub step_count: u64,

    pub world: ScenarioWorld,
    pub squad: SquadController,
    strategist: Box<dyn ILevelupStrategist>,

    pub levelup_interval: f64,
    pub next_levelup: f64,
    pub level: u32,
    pub levelups: Vec<Levelup>,

    pub verbose_level: u8,
}

impl SimulationEngine {
    pub fn new(scenario: ScenarioConfig, verbose_level: u8) -> Result<Self, ScenarioError> {
        let squad = scenario.build_squad()?;
        let world = ScenarioWorld::from_scenario(&scenario);
        let strategist = scenario.levelup.strategy.build(scenario.sim.seed);

        if verbose_level > 0 {
            info!("シミュレーションエンジンを初期化しました");
            info!("  分隊: {}名 (リーダー: {})", squad.agents().len(), squad.leader_id());
            info!("  敵グループ: {}種", world.monsters.len());
        }

        Ok(Self {
            current_time: 0.0,
            dt: scenario.sim.dt_s,
            max_time: scenario.sim.t_max_s,
            step_count: 0,
            world,
            squad,
            strategist,
            levelup_interval: scenario.sim.levelup_interval_s,
            next_levelup: scenario.sim.levelup_interval_s,
            level: 1,
            levelups: Vec::new(),
            verbose_level,
        })
    }

    pub fn run(&mut self) -> SimulationReport {
        info!("=== シミュレーション実行開始 ===");

        while self.current_time < self.max_time {
            self.step();

            if self.verbose_level > 2 {
                trace!("時刻: {:.1}秒 (ステップ: {})", self.current_time, self.step_count);
            }

            if self.step_count % 100 == 0 && self.verbose_level > 0 {
                let progress = (self.current_time / self.max_time) * 100.0;
                info!("進行状況: {:.1}% ({:.1}/{:.1}秒)", progress, self.current_time, self.max_time);
            }
        }

        info!("=== シミュレーション完了 ===");
        info!("実行時間: {:.1}秒", self.current_time);
        info!("総ステップ数: {}", self.step_count);
        info!("リーダー継承: {}回 (現リーダー: {})", self.squad.successions().len(), self.squad.leader_id());

        SimulationReport {
            steps: self.step_count,
            final_time: self.current_time,
            successions: self.squad.successions().to_vec(),
            levelups: self.levelups.clone(),
            final_leader: self.squad.leader_id().to_string(),
        }
    }

    pub fn step(&mut self) {
        let t = self.current_time;
        let snapshot = self.world.snapshot(t);
        let intents = self.squad.tick(t, self.dt, &snapshot);

        if self.verbose_level > 1 {
            for (id, intent) in &intents {
                debug!("{}: {:?}", id, intent);
            }
        }

        self.world.apply_intents(&intents, t, self.dt);
        self.process_levelup(t);

        // 刻みの累積誤差を避けるためステップ数から時刻を求める
        self.step_count += 1;
        self.current_time = self.step_count as f64 * self.dt;
    }

    fn process_levelup(&mut self, t: f64) {
        if t < self.next_levelup {
            return;
        }
        self.next_levelup += self.levelup_interval;

        let info = LevelupInfo { level: self.level + 1 };
        let roster = self.world.present_heroes(t);
        match self.strategist.levelup(t, &info, &roster) {
            Ok(choice) => {
                if self.verbose_level > 0 {
                    info!("レベルアップ {}: {} に {:?}", info.level, choice.hero, choice.option);
                }
                self.level = info.level;
                self.levelups.push(choice);
            }
            Err(e) => warn!("レベルアップをスキップしました: {}", e),
        }
    }
}
