use data_encoding::BASE64;
use rocket::fs::TempFile;
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

use crate::config::Config;

fn extension_from_filename(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

fn extension_from_mime(mime_type: &str) -> Option<String> {
    match mime_type {
        "image/jpeg" | "image/jpg" => Some("jpg".to_string()),
        "image/png" => Some("png".to_string()),
        "application/pdf" => Some("pdf".to_string()),
        _ => None,
    }
}

fn is_valid_document_extension(ext: &str) -> bool {
    matches!(ext, "pdf" | "jpg" | "jpeg" | "png")
}

fn unique_filename(kind: &str, mobile: &str, ext: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}.{}", kind, mobile, &suffix[..8], ext)
}

/// Store an uploaded ID document under the upload directory with a
/// collision-free name; returns the stored filename.
pub async fn save_id_document(file: &mut TempFile<'_>, mobile: &str) -> Result<String, String> {
    let extension = file
        .name()
        .and_then(extension_from_filename)
        .or_else(|| {
            file.content_type()
                .and_then(|ct| extension_from_mime(&ct.to_string()))
        })
        .ok_or("Cannot determine the uploaded file type")?;

    if !is_valid_document_extension(&extension) {
        return Err(format!(
            "Unsupported file type '{}'. Allowed: pdf, jpg, jpeg, png",
            extension
        ));
    }

    let dir = Config::upload_dir();
    fs::create_dir_all(&dir)
        .await
        .map_err(|e| format!("cannot create upload dir: {}", e))?;

    let filename = unique_filename("id_document", mobile, &extension);
    let dest = Path::new(&dir).join(&filename);
    file.copy_to(&dest)
        .await
        .map_err(|e| format!("cannot store upload: {}", e))?;

    Ok(filename)
}

/// Base64 variant for clients that cannot post multipart forms. Accepts a
/// bare payload or a `data:` URL.
pub async fn save_base64_document(
    filename: &str,
    mime_type: &str,
    data: &str,
    mobile: &str,
) -> Result<String, String> {
    let extension = extension_from_mime(mime_type)
        .or_else(|| extension_from_filename(filename))
        .ok_or("Cannot determine the uploaded file type")?;

    if !is_valid_document_extension(&extension) {
        return Err(format!(
            "Unsupported file type '{}'. Allowed: pdf, jpg, jpeg, png",
            extension
        ));
    }

    let encoded = data.rsplit(',').next().unwrap_or(data).trim();
    let bytes = BASE64
        .decode(encoded.as_bytes())
        .map_err(|_| "Invalid base64 payload")?;
    if bytes.is_empty() {
        return Err("Empty file payload".to_string());
    }

    let dir = Config::upload_dir();
    fs::create_dir_all(&dir)
        .await
        .map_err(|e| format!("cannot create upload dir: {}", e))?;

    let stored = unique_filename("id_document", mobile, &extension);
    let dest = Path::new(&dir).join(&stored);
    fs::write(&dest, &bytes)
        .await
        .map_err(|e| format!("cannot store upload: {}", e))?;

    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_extensions_are_lowercased() {
        assert_eq!(extension_from_filename("scan.PDF"), Some("pdf".to_string()));
        assert_eq!(extension_from_filename("photo.jpeg"), Some("jpeg".to_string()));
        assert_eq!(extension_from_filename("noext"), None);
    }

    #[test]
    fn mime_mapping_covers_documents_and_images() {
        assert_eq!(extension_from_mime("application/pdf"), Some("pdf".to_string()));
        assert_eq!(extension_from_mime("image/jpeg"), Some("jpg".to_string()));
        assert_eq!(extension_from_mime("text/html"), None);
    }

    #[test]
    fn stored_names_embed_kind_mobile_and_suffix() {
        let name = unique_filename("id_document", "9876543210", "png");
        assert!(name.starts_with("id_document_9876543210_"));
        assert!(name.ends_with(".png"));
        assert_ne!(name, unique_filename("id_document", "9876543210", "png"));
    }
}
