//! # Squad モジュール
//!
//! 分隊のロスター、現在のリーダー、リーダー継承を管理する`SquadController`を提供します。
//!
//! ## 継承プロトコル
//!
//! ティック中に最初にリーダーを見失ったフォロワー`F`について:
//!
//! 1. `F`をリーダーに昇格（追従先なし）
//! 2. 旧リーダー`L`をフォロワーに降格し、`F`を追従させる
//! 3. その他のフォロワーの追従先を`F`に付け替える
//! 4. `leader_id`を`F`に更新
//!
//! 継承は1ティックにつき1回までです。同じティック内で後から評価される
//! エージェントは更新済みのロスターを参照します。

use std::collections::HashSet;

use tracing::{debug, info, trace};

use crate::error::{SquadError, SquadResult};
use crate::models::behavior::{self, Agent, Evaluation, Intent, NavigationConfig, Role, TickContext};
use crate::models::world::{WorldQuery, WorldSnapshot};

/// リーダー継承の記録
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessionEvent {
    /// 発生時刻（秒）
    pub time: f64,
    pub new_leader: String,
    pub former_leader: String,
}

/// 分隊コントローラー
///
/// 全エージェントをIDで所有し、エージェント同士は直接参照を持ちません。
#[derive(Debug, Clone)]
pub struct SquadController {
    /// 編成順（評価順）に並んだエージェント
    agents: Vec<Agent>,
    leader_id: String,
    config: NavigationConfig,
    query: WorldQuery,
    successions: Vec<SuccessionEvent>,
}

impl SquadController {
    /// ロスターから分隊を編成します
    ///
    /// # 引数
    ///
    /// * `roster` - エージェントID（この順序が評価順になる）
    /// * `leader_id` - 初期リーダーのID
    /// * `config` - ナビゲーション定数
    /// * `query` - 極抽出ルール
    pub fn form(
        roster: &[String],
        leader_id: &str,
        config: NavigationConfig,
        query: WorldQuery,
    ) -> SquadResult<Self> {
        if roster.is_empty() {
            return Err(SquadError::EmptyRoster);
        }

        let mut seen = HashSet::new();
        for id in roster {
            if !seen.insert(id.as_str()) {
                return Err(SquadError::DuplicateAgent(id.clone()));
            }
        }
        if !seen.contains(leader_id) {
            return Err(SquadError::LeaderNotInRoster(leader_id.to_string()));
        }

        let agents = roster
            .iter()
            .map(|id| {
                if id == leader_id {
                    Agent::leader(id.clone(), &config)
                } else {
                    Agent::follower(id.clone(), leader_id.to_string(), &config)
                }
            })
            .collect();

        debug!("分隊を編成しました: {}名 (リーダー: {})", roster.len(), leader_id);

        Ok(Self {
            agents,
            leader_id: leader_id.to_string(),
            config,
            query,
            successions: Vec::new(),
        })
    }

    pub fn leader_id(&self) -> &str {
        &self.leader_id
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    pub fn successions(&self) -> &[SuccessionEvent] {
        &self.successions
    }

    /// 1ティック分の移動指示を計算します
    ///
    /// 戻り値は編成順の`(エージェントID, 移動指示)`の組です。
    pub fn tick(&mut self, t: f64, dt: f64, world: &WorldSnapshot) -> Vec<(String, Intent)> {
        let ctx = TickContext {
            t,
            dt,
            world,
            query: &self.query,
            config: &self.config,
        };
        let mut intents = Vec::with_capacity(self.agents.len());
        let mut succeeded = false;

        for index in 0..self.agents.len() {
            let intent = match behavior::evaluate(&mut self.agents[index], &ctx) {
                Evaluation::Intent(intent) => intent,
                Evaluation::LeaderLost if succeeded => {
                    trace!("{}: このティックの継承は処理済みのため待機", self.agents[index].id);
                    Intent::Hold
                }
                Evaluation::LeaderLost => {
                    let event = succession(&mut self.agents, &mut self.leader_id, index, t);
                    info!(
                        "リーダー継承: {} → {} (時刻: {:.2}秒)",
                        event.former_leader, event.new_leader, event.time
                    );
                    self.successions.push(event);
                    succeeded = true;

                    // 新しい役割で同じティック内に再評価
                    match behavior::evaluate(&mut self.agents[index], &ctx) {
                        Evaluation::Intent(intent) => intent,
                        Evaluation::LeaderLost => Intent::Hold,
                    }
                }
            };

            trace!("{}: {:?}", self.agents[index].id, intent);
            intents.push((self.agents[index].id.clone(), intent));
        }

        intents
    }

    /// 全フォロワーが現在のリーダーを追従しているか
    pub fn is_consistent(&self) -> bool {
        let leaders: Vec<&Agent> = self.agents.iter().filter(|a| a.is_leader()).collect();
        leaders.len() == 1
            && leaders[0].id == self.leader_id
            && leaders[0].following_id.is_none()
            && self
                .agents
                .iter()
                .filter(|a| !a.is_leader())
                .all(|a| a.following_id.as_deref() == Some(self.leader_id.as_str()))
    }
}

/// `agents[promoted]`を新リーダーとして継承を実行
fn succession(
    agents: &mut [Agent],
    leader_id: &mut String,
    promoted: usize,
    t: f64,
) -> SuccessionEvent {
    let former = leader_id.clone();
    let new_leader = agents[promoted].id.clone();

    for agent in agents.iter_mut() {
        if agent.id == new_leader {
            agent.role = Role::Leader;
            agent.following_id = None;
        } else {
            agent.role = Role::Follower;
            agent.following_id = Some(new_leader.clone());
        }
    }
    *leader_id = new_leader.clone();

    SuccessionEvent {
        time: t,
        new_leader,
        former_leader: former,
    }
}
