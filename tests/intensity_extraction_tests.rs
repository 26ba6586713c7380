//! 强度提取集成测试
//!
//! 验证设备内置算法（最亮10个像素均值）的边界与等价性。

use mcr_spot_tool::{IntensityMethod, IntensityStrategy, PixelRegion, SpotError, extract_intensity};

fn log(msg_zh: impl AsRef<str>, msg_en: impl AsRef<str>) {
    println!("{} / {}", msg_zh.as_ref(), msg_en.as_ref());
}

/// 参照实现：整体排序后取最后10个，按设备软件对10个元素的成对分组求和
///
/// `((v0+v1)+(v2+v3))+((v4+v5)+(v6+v7))`，再依次加 `v8`、`v9`
fn sorted_tail_mean(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let v = &sorted[sorted.len() - 10..];
    let head = ((v[0] + v[1]) + (v[2] + v[3])) + ((v[4] + v[5]) + (v[6] + v[7]));
    (head + v[8] + v[9]) / 10.0
}

/// 顺序累加的均值（与设备软件不一致的做法）
fn sequential_tail_mean(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted[sorted.len() - 10..].iter().fold(0.0, |acc, &v| acc + v) / 10.0
}

#[test]
fn test_constant_region_returns_constant() {
    log("常数区域", "Constant region");

    for c in [0.0, 0.1, 0.25, 0.7, 1.0, 1.1, 123.5, 65535.0] {
        for (rows, cols) in [(2, 5), (4, 4), (11, 13)] {
            let region = PixelRegion::new(rows, cols, vec![c; rows * cols]).unwrap();
            assert_eq!(extract_intensity(&region).unwrap(), c, "c={c} {rows}x{cols}");
        }
    }
}

#[test]
fn test_matches_full_sort_reference() {
    log("与整体排序参照实现一致", "Matches full-sort reference");

    // 确定性的非单调像素模式
    let samples: Vec<f64> = (0..400)
        .map(|i| ((i * 7919) % 1013) as f64 * 0.37 + (i % 17) as f64)
        .collect();
    let region = PixelRegion::new(20, 20, samples.clone()).unwrap();

    assert_eq!(extract_intensity(&region).unwrap(), sorted_tail_mean(&samples));
}

/// 与设备软件输出逐位一致的固定案例
///
/// 该输入下顺序累加得到 143.99，成对求和得到 143.98999999999998。
#[test]
fn test_pinned_legacy_mean() {
    log("固定案例逐位一致", "Pinned bit-exact case");

    let samples = vec![
        7.8, 133.6, 152.9, 114.6, 175.1, 62.7, 139.1, 118.9, 116.0, 91.2, 168.0, 188.9, 94.8,
        132.8,
    ];
    let region = PixelRegion::new(2, 7, samples.clone()).unwrap();
    let value = extract_intensity(&region).unwrap();

    assert_eq!(value, 143.98999999999998);
    assert_ne!(value, sequential_tail_mean(&samples));
}

#[test]
fn test_ties_do_not_affect_result() {
    // 多个像素并列最亮，只有最亮10个的多重集合起作用
    let mut a = vec![1.0; 30];
    let mut b = vec![1.0; 30];
    for i in 0..12 {
        a[i] = 50.0;
        b[29 - i] = 50.0;
    }

    let ra = PixelRegion::new(5, 6, a).unwrap();
    let rb = PixelRegion::new(6, 5, b).unwrap();
    assert_eq!(extract_intensity(&ra).unwrap(), 50.0);
    assert_eq!(extract_intensity(&ra).unwrap(), extract_intensity(&rb).unwrap());
}

#[test]
fn test_layout_does_not_matter() {
    let samples: Vec<f64> = (0..24).map(f64::from).collect();
    let wide = PixelRegion::new(2, 12, samples.clone()).unwrap();
    let tall = PixelRegion::new(12, 2, samples).unwrap();

    // 最亮10个：14..=23，均值18.5
    assert_eq!(extract_intensity(&wide).unwrap(), 18.5);
    assert_eq!(extract_intensity(&tall).unwrap(), 18.5);
}

#[test]
fn test_from_u16_camera_data() {
    let raw: Vec<u16> = (0..16).map(|i| i * 1000).collect();
    let region = PixelRegion::from_u16(4, 4, &raw).unwrap();

    // 最亮10个：6000..=15000，均值10500
    assert_eq!(extract_intensity(&region).unwrap(), 10500.0);
}

#[test]
fn test_five_samples_insufficient() {
    log("5个样本应失败", "Five samples must fail");

    let region = PixelRegion::from_rows(vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]]).unwrap();
    assert!(matches!(
        extract_intensity(&region),
        Err(SpotError::InsufficientData {
            required: 10,
            actual: 5
        })
    ));
}

#[test]
fn test_empty_region_insufficient() {
    let region = PixelRegion::from_rows(Vec::new()).unwrap();
    assert!(matches!(
        extract_intensity(&region),
        Err(SpotError::InsufficientData { actual: 0, .. })
    ));
}

#[test]
fn test_strategy_trait_matches_free_function() {
    let samples: Vec<f64> = (0..50).map(|i| (i * i % 37) as f64).collect();
    let region = PixelRegion::new(5, 10, samples).unwrap();

    let via_trait = IntensityMethod::DeviceBuiltin.extract(&region).unwrap();
    assert_eq!(via_trait, extract_intensity(&region).unwrap());
}

#[test]
fn test_concurrent_extraction_is_deterministic() {
    use std::thread;

    let samples: Vec<f64> = (0..256).map(|i| ((i * 31) % 97) as f64).collect();
    let region = PixelRegion::new(16, 16, samples).unwrap();
    let expected = extract_intensity(&region).unwrap();

    thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| extract_intensity(&region).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
