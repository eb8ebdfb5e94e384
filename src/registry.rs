use crate::error::Result;

/// Release to be created in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
    pub name: String,
    pub tag_name: String,
    pub target_commitish: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

impl NewRelease {
    /// Derive the release fields from a changelog version.
    pub fn for_version(version: &str, body: &str, target_commitish: &str, draft: bool) -> Self {
        let tag = format!("v{}", version);
        NewRelease {
            name: tag.clone(),
            tag_name: tag,
            target_commitish: target_commitish.to_string(),
            body: body.to_string(),
            draft,
            prerelease: version.contains('-'),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRelease {
    pub id: u64,
    pub tag_name: String,
    pub html_url: String,
}

/// Remote store of published releases for one repository.
pub trait ReleaseRegistry {
    /// Tag of the most recent release, if any exists.
    async fn latest_release_tag(&self) -> Result<Option<String>>;

    async fn create_release(&self, release: &NewRelease) -> Result<PublishedRelease>;
}

#[cfg(test)]
pub mod fake {
    use std::sync::Mutex;

    use super::*;
    use crate::error::ReleaseError;

    /// In-memory registry recording every call.
    #[derive(Default)]
    pub struct FakeRegistry {
        pub tags: Vec<String>,
        pub fail_create: bool,
        pub list_calls: Mutex<usize>,
        pub created: Mutex<Vec<NewRelease>>,
    }

    impl FakeRegistry {
        pub fn with_tags(tags: &[&str]) -> Self {
            FakeRegistry {
                tags: tags.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            }
        }

        pub fn created(&self) -> Vec<NewRelease> {
            self.created.lock().unwrap().clone()
        }
    }

    impl ReleaseRegistry for FakeRegistry {
        async fn latest_release_tag(&self) -> Result<Option<String>> {
            *self.list_calls.lock().unwrap() += 1;
            Ok(self.tags.first().cloned())
        }

        async fn create_release(&self, release: &NewRelease) -> Result<PublishedRelease> {
            if self.fail_create {
                return Err(ReleaseError::registry(
                    "create release",
                    "HTTP 422: tag already exists",
                ));
            }
            let mut created = self.created.lock().unwrap();
            created.push(release.clone());
            Ok(PublishedRelease {
                id: created.len() as u64,
                tag_name: release.tag_name.clone(),
                html_url: format!(
                    "https://github.com/acme/widget/releases/tag/{}",
                    release.tag_name
                ),
            })
        }
    }
}
