pub struct FileSizeUtils;

impl FileSizeUtils {
    /// Size in KiB, rounded to the nearest integer (half up).
    pub fn kib_rounded(size: u64) -> u64 {
        size.saturating_add(512) / 1024
    }

    pub fn format_size(size: u64) -> String {
        const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kib_rounds_half_up() {
        assert_eq!(FileSizeUtils::kib_rounded(0), 0);
        assert_eq!(FileSizeUtils::kib_rounded(511), 0);
        assert_eq!(FileSizeUtils::kib_rounded(512), 1);
        assert_eq!(FileSizeUtils::kib_rounded(1535), 1);
        assert_eq!(FileSizeUtils::kib_rounded(1536), 2);
    }

    #[test]
    fn format_size_picks_unit() {
        assert_eq!(FileSizeUtils::format_size(900), "900 B");
        assert_eq!(FileSizeUtils::format_size(2048), "2.00 KB");
        assert_eq!(FileSizeUtils::format_size(5 * 1024 * 1024), "5.00 MB");
    }
}
