/// 启发式地标定位器
///
/// 基于坐标极值与按 Y 百分位划分的水平带定位地标，假设面部朝向 +Z、头顶朝向 +Y。
///
/// | 地标 | 区域 | 选择 |
/// |------|------|------|
/// | `nose_tip` | 全部顶点 | Z 最大 |
/// | `chin` | 全部顶点 | Y 最小 |
/// | `forehead_center` | Y > P70 | Y 最大 |
/// | `*_eye_outer` | 半侧，P40 < Y < P70 | Z 最大 |
/// | `*_eye_inner` | 同上 | 离中线最近 |
/// | `mouth_left` / `mouth_right` | 半侧，P20 < Y < P50 | Z 最大 |
/// | `mouth_center` | 口部带中 \|X - 中线\| < 0.5σ | Z 最大 |
///
/// 中线为 X 的中位数，σ 为口部带 X 的总体标准差。所有区间都是开区间；
/// 并列时取顶点序列中第一个出现的。区域为空的地标不输出。

use super::{LandmarkLocator, LandmarkName, LandmarkSet};
use crate::core::math::stats;
use crate::geometry::{Axis, Vertex, VertexSet};

const FOREHEAD_PERCENTILE: f64 = 70.0;
const EYE_BAND: (f64, f64) = (40.0, 70.0);
const MOUTH_BAND: (f64, f64) = (20.0, 50.0);
const MOUTH_CENTER_STD_FACTOR: f64 = 0.5;

/// 启发式定位器
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicLocator;

impl HeuristicLocator {
    pub fn new() -> Self {
        Self
    }
}

impl LandmarkLocator for HeuristicLocator {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn locate(&self, vertices: &VertexSet) -> LandmarkSet {
        let mut landmarks = LandmarkSet::new();
        if vertices.is_empty() {
            return landmarks;
        }

        let xs = vertices.axis_values(Axis::X);
        let ys = vertices.axis_values(Axis::Y);
        // 非空输入下百分位一定存在
        let pct = |p: f64| stats::percentile(&ys, p).unwrap_or(0.0);
        let center_x = stats::median(&xs).unwrap_or(0.0);

        let mut put = |name: LandmarkName, vertex: Option<&Vertex>| {
            if let Some(v) = vertex {
                landmarks.insert(name, *v);
            }
        };

        put(LandmarkName::NoseTip, first_max(vertices.iter(), |v| v.z));
        put(LandmarkName::Chin, first_min(vertices.iter(), |v| v.y));

        let forehead_floor = pct(FOREHEAD_PERCENTILE);
        put(
            LandmarkName::ForeheadCenter,
            first_max(vertices.iter().filter(|v| v.y > forehead_floor), |v| v.y),
        );

        // 眼部
        let (eye_low, eye_high) = (pct(EYE_BAND.0), pct(EYE_BAND.1));
        let in_eye_band = |v: &&Vertex| v.y > eye_low && v.y < eye_high;
        let left_eye: Vec<&Vertex> = vertices.iter().filter(|v| v.x < center_x).filter(in_eye_band).collect();
        let right_eye: Vec<&Vertex> = vertices.iter().filter(|v| v.x > center_x).filter(in_eye_band).collect();

        put(LandmarkName::LeftEyeOuter, first_max(left_eye.iter().copied(), |v| v.z));
        put(
            LandmarkName::LeftEyeInner,
            first_min(left_eye.iter().copied(), |v| (v.x - center_x).abs()),
        );
        put(LandmarkName::RightEyeOuter, first_max(right_eye.iter().copied(), |v| v.z));
        put(
            LandmarkName::RightEyeInner,
            first_min(right_eye.iter().copied(), |v| (v.x - center_x).abs()),
        );

        // 口部
        let (mouth_low, mouth_high) = (pct(MOUTH_BAND.0), pct(MOUTH_BAND.1));
        let mouth: Vec<&Vertex> = vertices
            .iter()
            .filter(|v| v.y > mouth_low && v.y < mouth_high)
            .collect();

        put(
            LandmarkName::MouthLeft,
            first_max(mouth.iter().copied().filter(|v| v.x < center_x), |v| v.z),
        );
        put(
            LandmarkName::MouthRight,
            first_max(mouth.iter().copied().filter(|v| v.x > center_x), |v| v.z),
        );

        let mouth_xs: Vec<f64> = mouth.iter().map(|v| v.x).collect();
        if let Some(sigma) = stats::std_dev(&mouth_xs) {
            let half_width = MOUTH_CENTER_STD_FACTOR * sigma;
            put(
                LandmarkName::MouthCenter,
                first_max(
                    mouth.iter().copied().filter(|v| (v.x - center_x).abs() < half_width),
                    |v| v.z,
                ),
            );
        }

        tracing::debug!(
            vertices = vertices.len(),
            found = landmarks.len(),
            center_x,
            "启发式定位完成"
        );

        landmarks
    }
}

/// 键值最大的第一个顶点；NaN 键被跳过
fn first_max<'a, I, F>(vertices: I, key: F) -> Option<&'a Vertex>
where
    I: IntoIterator<Item = &'a Vertex>,
    F: Fn(&Vertex) -> f64,
{
    first_by(vertices, key, |candidate, best| candidate > best)
}

/// 键值最小的第一个顶点；NaN 键被跳过
fn first_min<'a, I, F>(vertices: I, key: F) -> Option<&'a Vertex>
where
    I: IntoIterator<Item = &'a Vertex>,
    F: Fn(&Vertex) -> f64,
{
    first_by(vertices, key, |candidate, best| candidate < best)
}

fn first_by<'a, I, F>(vertices: I, key: F, better: fn(f64, f64) -> bool) -> Option<&'a Vertex>
where
    I: IntoIterator<Item = &'a Vertex>,
    F: Fn(&Vertex) -> f64,
{
    let mut best: Option<(&'a Vertex, f64)> = None;

    for vertex in vertices {
        let k = key(vertex);
        if k.is_nan() {
            continue;
        }
        // 只有严格更优才替换，并列保留先出现的
        match best {
            Some((_, best_key)) if !better(k, best_key) => {}
            _ => best = Some((vertex, k)),
        }
    }

    best.map(|(vertex, _)| vertex)
}


#[cfg(test)]
mod tests {
    use super::test_support::synthetic_face;
    use super::*;
    use crate::geometry::normalize_vertices;

    fn cube() -> VertexSet {
        let mut vertices = Vec::new();
        for x in [-1.0, 1.0] {
            for y in [-1.0, 1.0] {
                for z in [-1.0, 1.0] {
                    vertices.push(Vertex::new(x, y, z));
                }
            }
        }
        VertexSet::from_vertices(vertices)
    }

    #[test]
    fn test_empty_input() {
        let landmarks = HeuristicLocator::new().locate(&VertexSet::new());
        assert!(landmarks.is_empty());
    }

    #[test]
    fn test_cube_ties_take_first_vertex() {
        let landmarks = HeuristicLocator::new().locate(&cube());

        assert_eq!(
            landmarks.get(LandmarkName::NoseTip),
            Some(&Vertex::new(-1.0, -1.0, 1.0))
        );
        assert_eq!(
            landmarks.get(LandmarkName::Chin),
            Some(&Vertex::new(-1.0, -1.0, -1.0))
        );
    }

    #[test]
    fn test_cube_empty_regions_are_absent() {
        // 只有两个 Y 值，所有开区间带都为空
        let landmarks = HeuristicLocator::new().locate(&cube());

        assert_eq!(landmarks.len(), 2);
        assert!(!landmarks.contains(LandmarkName::ForeheadCenter));
        assert!(!landmarks.contains(LandmarkName::LeftEyeOuter));
        assert!(!landmarks.contains(LandmarkName::MouthCenter));
    }

    #[test]
    fn test_single_vertex() {
        let set = VertexSet::from_vertices(vec![Vertex::new(0.0, 0.0, 0.0)]);
        let landmarks = HeuristicLocator::new().locate(&set);

        assert_eq!(landmarks.len(), 2);
        assert!(landmarks.contains(LandmarkName::NoseTip));
        assert!(landmarks.contains(LandmarkName::Chin));
    }

    #[test]
    fn test_synthetic_face_finds_every_landmark() {
        let face = normalize_vertices(&synthetic_face());
        let landmarks = HeuristicLocator::new().locate(&face);

        assert_eq!(landmarks.len(), LandmarkName::ALL.len());

        let nose = landmarks.get(LandmarkName::NoseTip).unwrap();
        let max_z = face.axis_values(Axis::Z).into_iter().fold(f64::MIN, f64::max);
        assert_eq!(nose.z, max_z);

        let chin = landmarks.get(LandmarkName::Chin).unwrap();
        let forehead = landmarks.get(LandmarkName::ForeheadCenter).unwrap();
        assert!(forehead.y - chin.y > 0.19);
    }

    #[test]
    fn test_synthetic_face_sides() {
        let face = normalize_vertices(&synthetic_face());
        let landmarks = HeuristicLocator::new().locate(&face);
        let get = |name| landmarks.get(name).unwrap();

        for name in [
            LandmarkName::LeftEyeOuter,
            LandmarkName::LeftEyeInner,
            LandmarkName::MouthLeft,
        ] {
            assert!(get(name).x < 0.0, "{} should be left of center", name);
        }
        for name in [
            LandmarkName::RightEyeOuter,
            LandmarkName::RightEyeInner,
            LandmarkName::MouthRight,
        ] {
            assert!(get(name).x > 0.0, "{} should be right of center", name);
        }

        // 眼部带在口部带之上
        assert!(get(LandmarkName::LeftEyeOuter).y > get(LandmarkName::MouthLeft).y);
        assert!(get(LandmarkName::MouthCenter).x.abs() < 0.025);
    }

    /// 31 个顶点，Y 的百分位落在整数上：P20=-6，P40=-2，P50=0，P70=3；X 中位数为 0。
    /// 每条分带边界上都放了一个若被计入就会胜出的顶点。
    fn banded_face() -> Vec<Vertex> {
        [
            (-3.0, -10.0, 0.0), (3.0, -10.0, 0.0), (0.0, -10.0, 0.0),
            (-6.0, -8.0, 0.0), (6.0, -8.0, 0.0),
            (-1.0, -6.0, 9.0), (5.0, -6.0, 0.0), (-5.0, -6.0, 0.0),
            (-4.0, -4.0, 5.0), (4.0, -4.0, 6.0), (0.0, -4.0, 3.0),
            (-1.0, -2.0, 4.0), (1.0, -2.0, 2.0), (-6.0, -2.0, 0.0),
            (6.0, -1.0, 0.0),
            (0.0, 0.0, 10.0),
            (-5.0, 1.0, 4.0), (-2.0, 1.0, 1.0), (2.0, 1.0, 3.0), (5.0, 1.0, 5.0),
            (-1.0, 3.0, 8.0), (1.0, 3.0, 7.0), (0.0, 3.0, 0.0),
            (-4.0, 5.0, 0.0), (4.0, 5.0, 0.0), (-3.0, 7.0, 0.0), (3.0, 7.0, 0.0),
            (0.0, 9.0, 0.0), (-2.0, 9.0, 0.0), (2.0, 8.0, 0.0), (0.0, 6.0, 0.0),
        ]
        .into_iter()
        .map(|(x, y, z)| Vertex::new(x, y, z))
        .collect()
    }

    #[test]
    fn test_banded_face_exact_picks() {
        let face = banded_face();
        let landmarks = HeuristicLocator::new().locate(&VertexSet::from_vertices(face.clone()));
        let get = |name| landmarks.get(name).copied();

        assert_eq!(get(LandmarkName::NoseTip), Some(face[15]));
        assert_eq!(get(LandmarkName::Chin), Some(face[0]));
        // y=9 并列，取先出现的
        assert_eq!(get(LandmarkName::ForeheadCenter), Some(face[27]));

        assert_eq!(get(LandmarkName::LeftEyeOuter), Some(face[16]));
        assert_eq!(get(LandmarkName::LeftEyeInner), Some(face[17]));
        assert_eq!(get(LandmarkName::RightEyeOuter), Some(face[19]));
        assert_eq!(get(LandmarkName::RightEyeInner), Some(face[18]));

        assert_eq!(get(LandmarkName::MouthLeft), Some(face[8]));
        assert_eq!(get(LandmarkName::MouthRight), Some(face[9]));
        // σ = sqrt(106/7)，半宽约 1.95：(4, -4, 6) 被宽度过滤
        assert_eq!(get(LandmarkName::MouthCenter), Some(face[11]));
    }

    #[test]
    fn test_band_boundaries_are_excluded() {
        let face = banded_face();
        let landmarks = HeuristicLocator::new().locate(&VertexSet::from_vertices(face.clone()));
        let picked: Vec<Vertex> = landmarks.iter().map(|(_, v)| *v).collect();

        // y=-2 (P40) 与 y=3 (P70) 上的顶点不属于眼部
        for boundary in [face[11], face[20], face[21]] {
            assert_ne!(landmarks.get(LandmarkName::LeftEyeOuter), Some(&boundary));
            assert_ne!(landmarks.get(LandmarkName::LeftEyeInner), Some(&boundary));
            assert_ne!(landmarks.get(LandmarkName::RightEyeOuter), Some(&boundary));
            assert_ne!(landmarks.get(LandmarkName::RightEyeInner), Some(&boundary));
        }
        // y=-6 (P20) 上 z=9 的顶点不属于口部；y=3 (P70) 不属于前额
        assert!(!picked.contains(&face[5]));
        assert!(!picked.contains(&face[20]));
        // y=0 (P50) 只作为鼻尖出现，不作为口部中心
        assert_ne!(landmarks.get(LandmarkName::MouthCenter), Some(&face[15]));
    }

    #[test]
    fn test_locate_is_deterministic() {
        let face = normalize_vertices(&synthetic_face());
        let locator = HeuristicLocator::new();

        assert_eq!(locator.locate(&face), locator.locate(&face));
    }

    #[test]
    fn test_first_max_skips_nan() {
        let a = Vertex::new(0.0, 0.0, f64::NAN);
        let b = Vertex::new(1.0, 0.0, 0.5);
        let c = Vertex::new(2.0, 0.0, 0.5);

        let best = first_max([&a, &b, &c], |v| v.z).unwrap();
        assert_eq!(best.x, 1.0);
    }
}
