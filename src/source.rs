//! Dataset file access.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;

/// Open a dataset file, decompressing it when the name ends in `.gz`.
pub(crate) fn open_maybe_gz(path: &Path) -> std::io::Result<Box<dyn Read>> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|e| e == "gz") {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_plain_and_gzip_read_alike() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("rows.csv");
        let packed = dir.path().join("rows.csv.gz");
        std::fs::write(&plain, b"a,b\n1,2\n").unwrap();
        let mut encoder = GzEncoder::new(File::create(&packed).unwrap(), Compression::default());
        encoder.write_all(b"a,b\n1,2\n").unwrap();
        encoder.finish().unwrap();

        for path in [&plain, &packed] {
            let mut text = String::new();
            open_maybe_gz(path).unwrap().read_to_string(&mut text).unwrap();
            assert_eq!(text, "a,b\n1,2\n");
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(open_maybe_gz(Path::new("/nonexistent/rows.csv.gz")).is_err());
    }
}
