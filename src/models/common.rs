use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// 2次元ベクトル（位置・方向の両方に使用）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// ベクトルの長さ（極小の成分でもアンダーフローしない）
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// 単位ベクトル化
    ///
    /// 長さ0のベクトルはゼロベクトルを返します（エラーにはしない）。
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len)
        } else {
            Self::ZERO
        }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// 他の点までの距離
    pub fn distance(&self, other: &Vector2) -> f64 {
        (*other - *self).length()
    }

    /// 角度（ラジアン）から長さ`radius`のベクトルを作成
    pub fn from_polar(radius: f64, angle_rad: f64) -> Self {
        Self::new(radius * angle_rad.cos(), radius * angle_rad.sin())
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

impl Mul<Vector2> for f64 {
    type Output = Vector2;

    fn mul(self, v: Vector2) -> Self::Output {
        Vector2::new(self * v.x, self * v.y)
    }
}

impl Neg for Vector2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

impl std::iter::Sum for Vector2 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Vector2::ZERO, |acc, v| acc + v)
    }
}

/// 数学ユーティリティ関数
pub mod math_utils {
    /// 度をラジアンに変換
    pub fn deg_to_rad(degrees: f64) -> f64 {
        degrees * std::f64::consts::PI / 180.0
    }

    /// 値を[0, period)の範囲に折り返す（負の時刻でも正の位相を返す）
    pub fn wrap(value: f64, period: f64) -> f64 {
        value.rem_euclid(period)
    }

    /// 許容誤差付きの浮動小数点比較
    pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_arithmetic() {
        let a = Vector2::new(1.0, 2.0);
        let b = Vector2::new(3.0, -1.0);
        assert_eq!(a + b, Vector2::new(4.0, 1.0));
        assert_eq!(a - b, Vector2::new(-2.0, 3.0));
        assert_eq!(a * 2.0, Vector2::new(2.0, 4.0));
        assert_eq!(2.0 * a, Vector2::new(2.0, 4.0));
        assert_eq!(Vector2::new(3.0, 4.0).length(), 5.0);
        // 二乗すると0に潰れる大きさでも正しい長さを返す
        assert_eq!(Vector2::new(3.3e-162, 0.0).length(), 3.3e-162);
        assert_eq!(Vector2::new(0.0, -1e-170).length(), 1e-170);
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(Vector2::ZERO.normalize(), Vector2::ZERO);
        let n = Vector2::new(3.0, 4.0).normalize();
        assert!(math_utils::approx_eq(n.length(), 1.0, 1e-12));
        assert!(math_utils::approx_eq(n.x, 0.6, 1e-12));
    }

    #[test]
    fn test_sum_of_vectors() {
        let total: Vector2 = vec![Vector2::new(1.0, 0.0), Vector2::new(0.0, 2.0)]
            .into_iter()
            .sum();
        assert_eq!(total, Vector2::new(1.0, 2.0));
        let empty: Vector2 = Vec::<Vector2>::new().into_iter().sum();
        assert_eq!(empty, Vector2::ZERO);
    }

    #[test]
    fn test_wrap_phase() {
        assert_eq!(math_utils::wrap(370.0, 360.0), 10.0);
        assert_eq!(math_utils::wrap(-10.0, 360.0), 350.0);
    }
}
