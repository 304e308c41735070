use super::upload_guard::{MIME_DOC, MIME_DOCX, MIME_MP4, MIME_OGG, MIME_PDF, MIME_WEBM};

/// 验证文件内容的魔术字节是否与声明的 MIME 类型匹配
///
/// # Arguments
/// * `data` - 文件内容的前几个字节
/// * `mime_type` - 客户端声明的 MIME 类型
///
/// # Returns
/// * `true` - 魔术字节匹配
/// * `false` - 魔术字节不匹配或类型未知
pub fn validate_magic_bytes(data: &[u8], mime_type: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    match mime_type.to_ascii_lowercase().as_str() {
        MIME_PDF => data.starts_with(b"%PDF"),
        // MS Office 旧格式 (OLE Compound Document)
        MIME_DOC => data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
        // MS Office 新格式 (ZIP-based OOXML)
        MIME_DOCX => data.starts_with(&[0x50, 0x4B, 0x03, 0x04]),
        // ISO BMFF：偏移 4 处是 ftyp box
        MIME_MP4 => data.len() >= 8 && &data[4..8] == b"ftyp",
        // EBML 头
        MIME_WEBM => data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]),
        MIME_OGG => data.starts_with(b"OggS"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_magic() {
        let pdf_header = b"%PDF-1.4";
        assert!(validate_magic_bytes(pdf_header, MIME_PDF));
        assert!(validate_magic_bytes(pdf_header, "Application/PDF"));
        assert!(!validate_magic_bytes(pdf_header, MIME_DOC));
    }

    #[test]
    fn test_office_magic() {
        let ole = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0x00];
        let zip = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00];
        assert!(validate_magic_bytes(&ole, MIME_DOC));
        assert!(!validate_magic_bytes(&ole, MIME_DOCX));
        assert!(validate_magic_bytes(&zip, MIME_DOCX));
        assert!(!validate_magic_bytes(&zip, MIME_PDF));
    }

    #[test]
    fn test_video_magic() {
        let mp4 = [0x00, 0x00, 0x00, 0x20, b'f', b't', b'y', b'p', b'i', b's', b'o', b'm'];
        assert!(validate_magic_bytes(&mp4, MIME_MP4));
        assert!(!validate_magic_bytes(&mp4[..6], MIME_MP4));
        assert!(validate_magic_bytes(&[0x1A, 0x45, 0xDF, 0xA3, 0x01], MIME_WEBM));
        assert!(validate_magic_bytes(b"OggS\x00\x02", MIME_OGG));
    }

    #[test]
    fn test_empty_data() {
        assert!(!validate_magic_bytes(&[], MIME_PDF));
    }

    #[test]
    fn test_unknown_type() {
        assert!(!validate_magic_bytes(b"%PDF-1.7", "application/zip"));
        assert!(!validate_magic_bytes(b"MZ\x90\x00", "application/x-msdownload"));
    }
}
