use color_eyre::Result;
use color_eyre::eyre::Context;
use common_services::collaborators::Collaborators;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

/// What a cleanup run removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub objects: usize,
    pub records: usize,
    pub faces: usize,
}

pub async fn run_setup(collaborators: &Collaborators) -> Result<()> {
    collaborators.ensure_ready().await?;
    info!("✅ Face collection, object storage and person table are ready.");
    Ok(())
}

/// Ask on stdin; only an exact `YES` proceeds.
pub async fn confirm_cleanup() -> Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(
            b"This deletes every photo, person and indexed face. Type YES to continue: ",
        )
        .await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;
    Ok(answer.trim() == "YES")
}

/// Wipe objects, then records, then faces.
///
/// Objects go first so no presigned link outlives its record; faces go last so a
/// half-finished run still leaves nothing that `/recognize` could announce.
pub async fn run_cleanup(collaborators: &Collaborators) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    report.objects = collaborators
        .objects
        .delete_prefix("")
        .await
        .wrap_err("Failed to delete stored objects")?;
    info!("Deleted {} objects", report.objects);

    let people = collaborators
        .people
        .list()
        .await
        .wrap_err("Failed to list person records")?;
    for person in people {
        if collaborators.people.delete(&person.person_id).await? {
            report.records += 1;
        } else {
            warn!("Record {} vanished during cleanup", person.person_id);
        }
    }
    info!("Deleted {} person records", report.records);

    let face_ids: Vec<String> = collaborators
        .faces
        .list_faces(None)
        .await
        .wrap_err("Failed to list indexed faces")?
        .into_iter()
        .map(|face| face.face_id)
        .collect();
    if !face_ids.is_empty() {
        report.faces = collaborators
            .faces
            .delete_faces(&face_ids)
            .await
            .wrap_err("Failed to delete indexed faces")?;
    }
    info!("Deleted {} faces", report.faces);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_services::collaborators::{
        MemoryFaceCollection, MemoryObjectStore, ObjectStore, FaceCollection, UrlSigner,
    };
    use common_services::database::{MemoryPersonStore, Person, PersonDetails, PersonStore};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Arc;

    fn jpeg(shade: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(32, 32, Rgb([shade, shade, shade]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Jpeg)
            .expect("jpeg encoding");
        out.into_inner()
    }

    #[tokio::test]
    async fn test_cleanup_removes_everything() -> Result<()> {
        // ARRANGE
        let faces = Arc::new(MemoryFaceCollection::new());
        let objects = Arc::new(MemoryObjectStore::new());
        let people = Arc::new(MemoryPersonStore::new());
        let collaborators = Collaborators::new(
            faces.clone(),
            objects.clone(),
            people.clone(),
            UrlSigner::new("http://localhost:8000", b"task-secret", 5),
        );
        for (id, shade) in [("p1", 20), ("p2", 220)] {
            people.insert(&Person::new(id, PersonDetails::default())).await?;
            objects.put(&format!("{id}/m1.jpg"), &jpeg(shade)).await?;
            faces.index(&jpeg(shade), id).await?;
        }

        // ACT
        run_setup(&collaborators).await?;
        let report = run_cleanup(&collaborators).await?;

        // ASSERT
        assert_eq!(
            report,
            CleanupReport {
                objects: 2,
                records: 2,
                faces: 2
            }
        );
        assert!(objects.list("").await?.is_empty());
        assert!(people.list().await?.is_empty());
        assert!(faces.list_faces(None).await?.is_empty());

        let again = run_cleanup(&collaborators).await?;
        assert_eq!(again, CleanupReport::default());
        Ok(())
    }
}
