//! # Error モジュール
//!
//! 分隊ナビゲーションとシナリオ読み込みで発生するエラー型を定義します。

use std::path::PathBuf;
use thiserror::Error;

/// 分隊・ポテンシャル場の構築エラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SquadError {
    /// パラメータが許容範囲外（例: sigma <= 0）
    #[error("無効なパラメータ {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// ロスターが空
    #[error("ロスターが空です")]
    EmptyRoster,

    /// ロスター内でIDが重複している
    #[error("エージェントIDが重複しています: {0}")]
    DuplicateAgent(String),

    /// 指定されたリーダーがロスターに含まれていない
    #[error("リーダー {0} がロスターに含まれていません")]
    LeaderNotInRoster(String),
}

/// シナリオ読み込みエラー
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("シナリオファイルが見つかりません: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("ファイル読み込みエラー {}: {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("YAML解析エラー {}: {1}", .0.display())]
    Parse(PathBuf, #[source] serde_yaml::Error),

    #[error("設定検証エラー: {0}")]
    Validation(String),

    #[error("分隊構成エラー: {0}")]
    Squad(#[from] SquadError),
}

pub type SquadResult<T> = Result<T, SquadError>;
