// src/services/storage.rs

use async_trait::async_trait;
use std::{
    io::ErrorKind,
    path::PathBuf,
};

use uuid::Uuid;

use crate::common::error::AppError;

const ALLOWED_EXTENSIONS: [&str; 6] = ["jpe", "jpg", "jpeg", "png", "webp", "gif"];

/// Onde as fotos dos veículos ficam guardadas.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn save(&self, filename: &str, contents: &[u8]) -> Result<(), AppError>;

    /// Devolve `false` se o ficheiro já não existia.
    async fn delete(&self, filename: &str) -> Result<bool, AppError>;
}

/// Guarda as imagens numa pasta local servida como estática.
pub struct LocalImageStorage {
    root: PathBuf,
}

impl LocalImageStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    async fn save(&self, filename: &str, contents: &[u8]) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(filename), contents).await?;
        Ok(())
    }

    async fn delete(&self, filename: &str) -> Result<bool, AppError> {
        match tokio::fs::remove_file(self.root.join(filename)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reduz um nome de ficheiro enviado pelo cliente a algo seguro para o disco:
/// só ASCII alfanumérico, `.`, `_` e `-`; sem componentes de diretório.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_').to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Valida e normaliza o nome de uma imagem enviada.
pub fn image_filename(raw: &str) -> Result<String, AppError> {
    let name = sanitize_filename(raw)
        .ok_or_else(|| AppError::InvalidUpload("nome de ficheiro vazio".into()))?;

    let (_, extension) = name
        .rsplit_once('.')
        .ok_or_else(|| AppError::InvalidUpload("ficheiro sem extensão".into()))?;

    if !ALLOWED_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()) {
        return Err(AppError::InvalidUpload(format!("extensão '{}' não permitida", extension)));
    }
    Ok(name)
}

/// Nome com que a imagem fica guardada: prefixado pelo veículo, já que
/// todas as fotos partilham a mesma pasta.
pub fn vehicle_image_name(vehicle_id: Uuid, raw: &str) -> Result<String, AppError> {
    Ok(format!("{}_{}", vehicle_id.simple(), image_filename(raw)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sanitize_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_filename("C:\\fotos\\meu carro.JPG").as_deref(), Some("meu_carro.JPG"));
        assert_eq!(sanitize_filename("çarro (1).png").as_deref(), Some("arro_1.png"));
        assert_eq!(sanitize_filename("..."), None);
    }

    #[test]
    fn only_image_extensions_are_accepted() {
        assert_eq!(image_filename("frente.jpeg").unwrap(), "frente.jpeg");
        assert!(matches!(image_filename("script.sh"), Err(AppError::InvalidUpload(_))));
        assert!(matches!(image_filename("semextensao"), Err(AppError::InvalidUpload(_))));
    }

    #[tokio::test]
    async fn same_upload_name_on_two_vehicles_keeps_both_files() {
        let dir = tempdir().unwrap();
        let storage = LocalImageStorage::new(dir.path());

        let a = vehicle_image_name(Uuid::new_v4(), "frente.jpg").unwrap();
        let b = vehicle_image_name(Uuid::new_v4(), "frente.jpg").unwrap();
        assert_ne!(a, b);
        assert!(a.ends_with("_frente.jpg"));

        storage.save(&a, b"carro-a").await.unwrap();
        storage.save(&b, b"carro-b").await.unwrap();
        assert!(storage.delete(&b).await.unwrap());

        assert_eq!(std::fs::read(dir.path().join(&a)).unwrap(), b"carro-a");
    }

    #[test]
    fn vehicle_image_name_keeps_extension_checks() {
        assert!(matches!(
            vehicle_image_name(Uuid::new_v4(), "script.sh"),
            Err(AppError::InvalidUpload(_))
        ));
    }

    #[tokio::test]
    async fn local_storage_saves_and_deletes() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("images");
        let storage = LocalImageStorage::new(root.clone());

        storage.save("a.png", b"png-bytes").await.unwrap();
        assert!(root.join("a.png").exists());

        assert!(storage.delete("a.png").await.unwrap());
        assert!(!storage.delete("a.png").await.unwrap());
    }
}
