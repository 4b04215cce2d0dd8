/// `/proc/diskstats` 解析
///
/// 仅统计整块磁盘（`/sys/block/<name>` 存在的设备），分区不重复计入。

use std::path::Path;

use common::DiskCounters;

/// 内核 diskstats 中扇区固定为 512 字节
const SECTOR_SIZE: u64 = 512;

pub const DISKSTATS_PATH: &str = "/proc/diskstats";

/// 读取并汇总所有整块磁盘的累计读写字节数
pub fn read_disk_counters() -> common::Result<DiskCounters> {
    let content = std::fs::read_to_string(DISKSTATS_PATH)?;
    Ok(parse_diskstats(&content, is_block_device))
}

/// 解析 diskstats 内容
///
/// 每行格式：major minor name reads merged sectors_read ms writes merged sectors_written ...
pub fn parse_diskstats<F>(content: &str, include: F) -> DiskCounters
where
    F: Fn(&str) -> bool,
{
    content
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 10 {
                return None;
            }
            let name = fields[2];
            if !include(name) {
                return None;
            }
            let sectors_read: u64 = fields[5].parse().ok()?;
            let sectors_written: u64 = fields[9].parse().ok()?;
            Some(DiskCounters::new(
                sectors_read.wrapping_mul(SECTOR_SIZE),
                sectors_written.wrapping_mul(SECTOR_SIZE),
            ))
        })
        .fold(DiskCounters::default(), |acc, d| {
            DiskCounters::new(
                acc.bytes_read.wrapping_add(d.bytes_read),
                acc.bytes_written.wrapping_add(d.bytes_written),
            )
        })
}

fn is_block_device(name: &str) -> bool {
    Path::new("/sys/block").join(name.replace('/', "!")).exists()
}
