//! The contact directory
//!
//! [`Directory`] holds the authoritative list of contacts behind a single reader/writer lock and
//! mirrors it to a JSON file after every mutation. Lookups are linear scans with exact,
//! case-sensitive name comparison.
//!
//! The directory never logs or prints. Every failure is returned as a [`DirectoryError`].

use {
    crate::{json, Contact},
    std::{
        fs,
        io::{self, BufWriter, ErrorKind, Write},
        path::{Path, PathBuf},
        sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    },
    tempfile::NamedTempFile,
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("a contact named \"{0}\" already exists")]
    DuplicateName(String),

    #[error("contact \"{0}\" not found")]
    NotFound(String),

    #[error("failed to access contact store {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse contact store {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

/// An ordered, file-backed set of contacts with unique names.
///
/// Readers ([`list`](Self::list), [`contact_exists`](Self::contact_exists),
/// [`find_by_name`](Self::find_by_name), [`save`](Self::save)) share the lock. Writers
/// ([`add`](Self::add), [`delete`](Self::delete), [`edit`](Self::edit), [`load`](Self::load))
/// hold it exclusively across both the in-memory change and the file write that follows.
///
/// Nothing coordinates two processes pointed at the same file.
#[derive(Debug, Default)]
pub struct Directory {
    contacts: RwLock<Vec<Contact>>,
    path: Option<PathBuf>,
}

impl Directory {
    /// Create a directory that is never persisted.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Create a directory backed by the file at `path` and load it.
    ///
    /// A file that does not exist yet is not an error, the directory simply starts out empty. An
    /// empty path yields a memory-only directory.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let directory = Self {
            contacts: RwLock::new(Vec::new()),
            path: (!path.as_os_str().is_empty()).then_some(path),
        };
        directory.load()?;
        Ok(directory)
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Replace the in-memory contacts with the content of the backing file.
    ///
    /// Leaves the contacts untouched if the file is missing or has zero length. A file holding
    /// JSON `null` empties the directory.
    pub fn load(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut contacts = self.write();

        let data = match fs::read(path) {
            Ok(data) => data,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(DirectoryError::Io {
                    path: path.clone(),
                    source,
                })
            }
        };

        if data.is_empty() {
            return Ok(());
        }

        *contacts =
            json::contacts_from_json(data.as_slice()).map_err(|source| DirectoryError::Parse {
                path: path.clone(),
                source,
            })?;

        Ok(())
    }

    /// Overwrite the backing file with the current contacts.
    pub fn save(&self) -> Result<()> {
        let contacts = self.read();
        self.persist(&contacts)
    }

    /// A snapshot of all contacts in insertion order.
    pub fn list(&self) -> Vec<Contact> {
        self.read().clone()
    }

    /// Append `contact` and persist.
    ///
    /// If the file write fails the contact stays in memory and the I/O error is returned.
    pub fn add(&self, contact: Contact) -> Result<()> {
        let mut contacts = self.write();

        if contains(&contacts, &contact.name) {
            return Err(DirectoryError::DuplicateName(contact.name));
        }

        contacts.push(contact);
        self.persist(&contacts)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let mut contacts = self.write();

        let index = position(&contacts, name)
            .ok_or_else(|| DirectoryError::NotFound(name.to_owned()))?;

        contacts.remove(index);
        self.persist(&contacts)
    }

    /// Replace the contact named `old_name` with `contact`, keeping its position.
    ///
    /// Renaming onto the name of another existing contact fails with
    /// [`DirectoryError::DuplicateName`].
    pub fn edit(&self, old_name: &str, contact: Contact) -> Result<()> {
        let mut contacts = self.write();

        if contact.name != old_name && contains(&contacts, &contact.name) {
            return Err(DirectoryError::DuplicateName(contact.name));
        }

        let index = position(&contacts, old_name)
            .ok_or_else(|| DirectoryError::NotFound(old_name.to_owned()))?;

        contacts[index] = contact;
        self.persist(&contacts)
    }

    /// Whether a contact with the same name as `contact` exists. The phone number is ignored.
    pub fn contact_exists(&self, contact: &Contact) -> bool {
        contains(&self.read(), &contact.name)
    }

    /// All contacts named exactly `name`. An empty `name` matches every contact.
    pub fn find_by_name(&self, name: &str) -> Vec<Contact> {
        self.read()
            .iter()
            .filter(|contact| name.is_empty() || contact.name == name)
            .cloned()
            .collect()
    }

    /// Write `contacts` to the backing file. The caller must hold the lock.
    ///
    /// The JSON is written and synced to a temporary file in the same directory, which is then
    /// renamed over the backing file. A failed write leaves the previous file intact. The
    /// permissions of an existing backing file are kept.
    fn persist(&self, contacts: &[Contact]) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let io_error = |source: io::Error| DirectoryError::Io {
            path: path.clone(),
            source,
        };

        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;

        let mut writer = BufWriter::new(file.as_file_mut());
        json::contacts_to_json(&mut writer, contacts).map_err(|error| io_error(error.into()))?;
        writer.flush().map_err(io_error)?;
        drop(writer);

        match fs::metadata(path) {
            Ok(metadata) => file
                .as_file()
                .set_permissions(metadata.permissions())
                .map_err(io_error)?,
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => return Err(io_error(error)),
        }

        file.as_file().sync_all().map_err(io_error)?;
        file.persist(path).map_err(|error| io_error(error.error))?;
        Ok(())
    }

    // Every mutation leaves the list consistent before it calls anything fallible, so a
    // poisoned lock still guards valid data.

    fn read(&self) -> RwLockReadGuard<'_, Vec<Contact>> {
        self.contacts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Contact>> {
        self.contacts.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Holds the write lock as a slow file write would.
    #[cfg(test)]
    pub(crate) fn lock_exclusive(&self) -> RwLockWriteGuard<'_, Vec<Contact>> {
        self.write()
    }
}

fn position(contacts: &[Contact], name: &str) -> Option<usize> {
    contacts.iter().position(|contact| contact.name == name)
}

fn contains(contacts: &[Contact], name: &str) -> bool {
    position(contacts, name).is_some()
}
