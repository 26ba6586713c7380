//! 测量文件测试固件生成器
//!
//! 为工具层集成测试生成JSON测量文件

use fs2::FileExt;
use std::fs::{File, OpenOptions, create_dir_all};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

fn log(msg_zh: impl AsRef<str>, msg_en: impl AsRef<str>) {
    println!("{} / {}", msg_zh.as_ref(), msg_en.as_ref());
}

fn fixtures_base_dir() -> &'static PathBuf {
    static ROOT: OnceLock<PathBuf> = OnceLock::new();
    ROOT.get_or_init(|| {
        let path = match std::env::var("MCR_SPOT_FIXTURES_DIR") {
            Ok(custom) => PathBuf::from(custom),
            Err(_) => PathBuf::from("tests/fixtures"),
        };
        create_dir_all(&path).expect("无法创建测试固件目录");
        path
    })
}

/// 获取特定固件路径
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_base_dir().join(name)
}

/// 跨进程文件锁 + 进程内互斥，避免并发写入导致的截断文件。
struct FixtureLock {
    _mutex_guard: std::sync::MutexGuard<'static, ()>,
    lock_file: File,
}

impl FixtureLock {
    fn acquire() -> Self {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        let mutex = MUTEX.get_or_init(|| Mutex::new(()));
        let guard = mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let lock_path = fixtures_base_dir().join(".lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .expect("无法创建固件锁文件");
        file.lock_exclusive()
            .expect("无法获取固件文件锁，可能被其他进程占用");

        Self {
            _mutex_guard: guard,
            lock_file: file,
        }
    }
}

impl Drop for FixtureLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.lock_file);
    }
}

/// 生成 `rows x cols` 的像素矩阵：背景为 `background`，前 `bright` 个像素为 `peak`
pub fn spot_pixels(rows: usize, cols: usize, background: f64, peak: f64, bright: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| if r * cols + c < bright { peak } else { background })
                .collect()
        })
        .collect()
}

/// 确保所有固件生成完毕（幂等）。
///
/// - `batch/plate_a.json`：像素斑点，一组含离群值
/// - `batch/plate_b.json`：预计算强度 + 一个重复样不足的组
/// - `batch/broken.json`：损坏的JSON
/// - `batch/nested/plate_c.json`：子目录中的测量文件（仅递归扫描可见）
/// - `batch/notes.txt`：非测量文件
/// - `single/plate_single.json`：单文件模式
pub fn ensure_fixtures_generated() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let _guard = FixtureLock::acquire();
        log("开始生成测量固件...", "Generating measurement fixtures...");

        let batch = fixture_path("batch");
        create_dir_all(batch.join("nested")).expect("无法创建固件子目录");
        create_dir_all(fixture_path("single")).expect("无法创建固件子目录");

        // 每个斑点 5x5：10个亮像素 + 背景，DeviceBuiltin 强度即亮像素值
        let pixel_spot = |peak: f64| serde_json::json!({ "pixels": spot_pixels(5, 5, 3.0, peak, 10) });

        let plate_a = serde_json::json!({
            "name": "plate-a",
            "groups": [
                { "analyte": "IgG", "spots": [
                    pixel_spot(1000.0), pixel_spot(1020.0), pixel_spot(980.0),
                    pixel_spot(1500.0), pixel_spot(500.0)
                ] },
                { "analyte": "IgM", "spots": [
                    pixel_spot(200.0), pixel_spot(205.0), pixel_spot(198.0)
                ] }
            ]
        });

        let plate_b = serde_json::json!({
            "cutoff": 0.6,
            "groups": [
                { "analyte": "IgA", "spots": [
                    { "intensity": 10.0 }, { "intensity": 10.2 }, { "intensity": 9.8 },
                    { "intensity": 15.0 }, { "intensity": 5.0 }
                ] },
                { "analyte": "IgE", "spots": [ { "intensity": 1.0 }, { "intensity": 2.0 } ] }
            ]
        });

        let plate_c = serde_json::json!({
            "name": "plate-c",
            "groups": [
                { "analyte": "CRP", "spots": [
                    { "intensity": 50.0 }, { "intensity": 50.0 }, { "intensity": 50.0 }
                ] }
            ]
        });

        let single = serde_json::json!({
            "name": "single",
            "groups": [
                { "analyte": "IgG", "spots": [
                    { "intensity": 10.0 }, { "intensity": 10.2 }, { "intensity": 9.8 },
                    { "intensity": 15.0 }, { "intensity": 5.0 }
                ] }
            ]
        });

        let write_json = |path: PathBuf, value: &serde_json::Value| {
            let text = serde_json::to_string_pretty(value).expect("序列化固件失败");
            std::fs::write(&path, text).expect("写入固件失败");
        };

        write_json(batch.join("plate_a.json"), &plate_a);
        write_json(batch.join("plate_b.json"), &plate_b);
        write_json(batch.join("nested").join("plate_c.json"), &plate_c);
        write_json(fixture_path("single").join("plate_single.json"), &single);
        std::fs::write(batch.join("broken.json"), "{ \"groups\": [ ").expect("写入固件失败");
        std::fs::write(batch.join("notes.txt"), "not a measurement").expect("写入固件失败");

        log("测量固件生成完成", "Measurement fixtures generated");
    });
}
