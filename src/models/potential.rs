//! # Potential モジュール
//!
//! 引力極・斥力極（Pole）と、それらを1本の操舵ベクトルにまとめる
//! ポテンシャル場（PotentialField）を提供します。
//!
//! 各極はガウス型の空間減衰を持ち、距離`r`における強さは
//! `strength * exp(-r² / sigma²)`です。

use serde::{Deserialize, Serialize};

use crate::error::{SquadError, SquadResult};
use crate::models::common::Vector2;

/// 引力・斥力の点源
///
/// `scale = 1 / sigma²`は構築時に一度だけ計算され、以後変更されません。
#[derive(Debug, Clone, PartialEq)]
pub struct Pole {
    position: Vector2,
    strength: f64,
    sigma: f64,
    scale: f64,
}

impl Pole {
    /// 新しい極を作成します
    ///
    /// # 引数
    ///
    /// * `position` - 極の位置
    /// * `strength` - 極の強さ（符号はそのまま方向に反映される）
    /// * `sigma` - ガウス減衰の幅（正の値）
    ///
    /// # 戻り値
    ///
    /// `sigma`が正でない（NaNを含む）場合は`SquadError::InvalidParameter`
    pub fn new(position: Vector2, strength: f64, sigma: f64) -> SquadResult<Self> {
        if !(sigma > 0.0) {
            return Err(SquadError::InvalidParameter {
                name: "sigma",
                value: sigma,
            });
        }

        Ok(Self {
            position,
            strength,
            sigma,
            scale: 1.0 / (sigma * sigma),
        })
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// `query`地点での極の寄与ベクトル
    ///
    /// 問い合わせ位置が極と一致する場合はゼロベクトルを返します。
    pub fn direction(&self, query: Vector2) -> Vector2 {
        let v = self.position - query;
        let r = v.length();
        if r == 0.0 {
            return Vector2::ZERO;
        }

        // 先に単位ベクトル化する（magnitude / r は極小の r で溢れる）
        let unit = Vector2::new(v.x / r, v.y / r);
        let magnitude = self.strength * (-r * r * self.scale).exp();
        magnitude * unit
    }
}

/// ポテンシャル場出力の正規化方針
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizePolicy {
    /// 合成ベクトルをそのまま返す
    Raw,
    /// 合成ベクトルを単位ベクトル化して返す
    #[default]
    UnitVector,
}

/// 引力極と斥力極の集合（1回の判断にのみ有効なスナップショット）
#[derive(Debug, Clone, Default)]
pub struct PotentialField {
    pub attract: Vec<Pole>,
    pub repulse: Vec<Pole>,
    pub policy: NormalizePolicy,
}

impl PotentialField {
    pub fn new(attract: Vec<Pole>, repulse: Vec<Pole>, policy: NormalizePolicy) -> Self {
        Self {
            attract,
            repulse,
            policy,
        }
    }

    /// `query`地点での操舵方向
    ///
    /// 目標は先頭の引力極のみを使い、斥力極は全て合算して差し引きます。
    /// 両方の集合が空の場合はゼロベクトルです。
    pub fn direction(&self, query: Vector2) -> Vector2 {
        let goal = self
            .attract
            .first()
            .map(|pole| pole.direction(query))
            .unwrap_or(Vector2::ZERO);
        let avoid: Vector2 = self.repulse.iter().map(|pole| pole.direction(query)).sum();
        let total = goal - avoid;

        match self.policy {
            NormalizePolicy::Raw => total,
            NormalizePolicy::UnitVector => total.normalize(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attract.is_empty() && self.repulse.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::math_utils::approx_eq;

    fn pole(x: f64, y: f64, strength: f64, sigma: f64) -> Pole {
        Pole::new(Vector2::new(x, y), strength, sigma).unwrap()
    }

    #[test]
    fn test_pole_rejects_non_positive_sigma() {
        assert_eq!(
            Pole::new(Vector2::ZERO, 1.0, 0.0),
            Err(SquadError::InvalidParameter { name: "sigma", value: 0.0 })
        );
        assert!(Pole::new(Vector2::ZERO, 1.0, -2.0).is_err());
        assert!(Pole::new(Vector2::ZERO, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_pole_numeric_example() {
        let p = pole(0.0, 0.0, 10.0, 10.0);
        assert!(approx_eq(p.scale(), 0.01, 1e-15));

        let d = p.direction(Vector2::new(10.0, 0.0));
        let expected = 10.0 * (-1.0f64).exp();
        assert!(approx_eq(d.x, -expected, 1e-9));
        assert!(approx_eq(d.x, -3.6788, 1e-4));
        assert_eq!(d.y, 0.0);
    }

    #[test]
    fn test_pole_at_own_position_is_zero() {
        let p = pole(3.0, -4.0, 50.0, 2.0);
        let d = p.direction(Vector2::new(3.0, -4.0));
        assert_eq!(d, Vector2::ZERO);
        assert!(d.x.is_finite() && d.y.is_finite());
    }

    #[test]
    fn test_pole_magnitude_is_bounded_and_decays() {
        let p = pole(0.0, 0.0, -7.5, 4.0);
        for r in [1e-9, 0.1, 1.0, 4.0, 10.0, 100.0] {
            let d = p.direction(Vector2::new(r, 0.0));
            assert!(d.length() <= 7.5 + 1e-12);
            assert!(d.x.is_finite());
        }
        assert!(p.direction(Vector2::new(1000.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_pole_magnitude_is_bounded_for_tiny_offsets() {
        let p = pole(0.0, 0.0, 10.0, 1.0);
        for offset in [3.3e-162, 1e-200, 5e-310] {
            let q = Vector2::new(offset, 0.0);
            assert_ne!(q, p.position());
            let d = p.direction(q);
            assert!(d.x.is_finite() && d.y.is_finite());
            assert!(d.length() <= 10.0 + 1e-12, "|d| = {} at offset {}", d.length(), offset);
        }
    }

    #[test]
    fn test_empty_field_is_zero() {
        for policy in [NormalizePolicy::Raw, NormalizePolicy::UnitVector] {
            let field = PotentialField::new(vec![], vec![], policy);
            assert_eq!(field.direction(Vector2::new(1.0, 1.0)), Vector2::ZERO);
        }
    }

    #[test]
    fn test_only_first_attractor_is_used() {
        let first = pole(10.0, 0.0, 5.0, 20.0);
        let second = pole(0.0, 10.0, 500.0, 20.0);
        let field = PotentialField::new(vec![first.clone(), second], vec![], NormalizePolicy::Raw);
        assert_eq!(field.direction(Vector2::ZERO), first.direction(Vector2::ZERO));
    }

    #[test]
    fn test_repulse_poles_are_summed_and_subtracted() {
        let a = pole(5.0, 0.0, 2.0, 10.0);
        let b = pole(0.0, 5.0, 3.0, 10.0);
        let field = PotentialField::new(vec![], vec![a.clone(), b.clone()], NormalizePolicy::Raw);
        let q = Vector2::new(1.0, 1.0);
        let expected = -(a.direction(q) + b.direction(q));
        let d = field.direction(q);
        assert!(approx_eq(d.x, expected.x, 1e-12));
        assert!(approx_eq(d.y, expected.y, 1e-12));
        // 斥力極からは遠ざかる
        assert!(d.x < 0.0 && d.y < 0.0);
    }

    #[test]
    fn test_unit_vector_policy_normalizes() {
        let field = PotentialField::new(
            vec![pole(100.0, 0.0, 130.0, 100.0)],
            vec![],
            NormalizePolicy::UnitVector,
        );
        let d = field.direction(Vector2::ZERO);
        assert!(approx_eq(d.length(), 1.0, 1e-12));
        assert!(approx_eq(d.x, 1.0, 1e-12));
    }
}
