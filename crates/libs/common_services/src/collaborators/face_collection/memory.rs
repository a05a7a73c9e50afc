use super::{FaceCollection, FaceCollectionError, FaceMatch, IndexedFace};
use crate::utils::new_id;
use async_trait::async_trait;
use image::imageops::FilterType;
use tokio::sync::RwLock;

const SIGNATURE_SIDE: u32 = 16;

struct StoredFace {
    face: IndexedFace,
    signature: Vec<u8>,
}

/// In-process stand-in for the face collection.
///
/// Each "face" is the whole image reduced to a 16x16 grayscale signature, and
/// similarity is `100 * (1 - mean absolute difference / 255)`. Images smaller
/// than the signature contain no face.
#[derive(Default)]
pub struct MemoryFaceCollection {
    faces: RwLock<Vec<StoredFace>>,
}

impl MemoryFaceCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn signature(image: &[u8]) -> Result<Option<Vec<u8>>, FaceCollectionError> {
        let img = image::load_from_memory(image)
            .map_err(|e| FaceCollectionError::InvalidImage(e.to_string()))?;
        if img.width() < SIGNATURE_SIDE || img.height() < SIGNATURE_SIDE {
            return Ok(None);
        }
        let small = img
            .resize_exact(SIGNATURE_SIDE, SIGNATURE_SIDE, FilterType::Triangle)
            .to_luma8();
        Ok(Some(small.into_raw()))
    }

    #[must_use]
    pub fn similarity(a: &[u8], b: &[u8]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        let total: u64 = a
            .iter()
            .zip(b)
            .map(|(x, y)| u64::from(x.abs_diff(*y)))
            .sum();
        let mean = total as f32 / a.len() as f32;
        100.0 * (1.0 - mean / 255.0)
    }
}

#[async_trait]
impl FaceCollection for MemoryFaceCollection {
    async fn ensure_collection(&self) -> Result<(), FaceCollectionError> {
        Ok(())
    }

    async fn search(
        &self,
        image: &[u8],
        threshold: f32,
    ) -> Result<Option<FaceMatch>, FaceCollectionError> {
        let signature = Self::signature(image)?.ok_or(FaceCollectionError::NoFaceDetected)?;
        let faces = self.faces.read().await;
        Ok(faces
            .iter()
            .map(|stored| FaceMatch {
                face_id: stored.face.face_id.clone(),
                external_id: stored.face.external_id.clone(),
                similarity: Self::similarity(&signature, &stored.signature),
            })
            .filter(|m| m.similarity >= threshold)
            .max_by(|a, b| a.similarity.total_cmp(&b.similarity)))
    }

    async fn index(
        &self,
        image: &[u8],
        external_id: &str,
    ) -> Result<Option<IndexedFace>, FaceCollectionError> {
        let Some(signature) = Self::signature(image)? else {
            return Ok(None);
        };
        let face = IndexedFace {
            face_id: new_id(),
            external_id: external_id.to_string(),
        };
        self.faces.write().await.push(StoredFace {
            face: face.clone(),
            signature,
        });
        Ok(Some(face))
    }

    async fn list_faces(
        &self,
        external_id: Option<&str>,
    ) -> Result<Vec<IndexedFace>, FaceCollectionError> {
        let faces = self.faces.read().await;
        Ok(faces
            .iter()
            .filter(|stored| external_id.is_none_or(|id| stored.face.external_id == id))
            .map(|stored| stored.face.clone())
            .collect())
    }

    async fn delete_faces(&self, face_ids: &[String]) -> Result<usize, FaceCollectionError> {
        let mut faces = self.faces.write().await;
        let before = faces.len();
        faces.retain(|stored| !face_ids.contains(&stored.face.face_id));
        Ok(before - faces.len())
    }
}
