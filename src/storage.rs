//! # Almacén de Archivos
//! src/storage.rs
//!
//! El directorio servido visto como un almacén de bytes indexado por
//! nombre. Lo usan los handlers de `/files/<name>`.
//!
//! ## Reglas
//!
//! - Los nombres se resuelven siempre dentro del directorio servido:
//!   se rechazan `..`, `.`, segmentos vacíos, paths absolutos, `\` y NUL.
//! - La escritura es atómica: se escribe a un archivo temporal en el
//!   mismo directorio y luego se hace `rename`. Un GET concurrente ve el
//!   archivo viejo o el nuevo completo, nunca uno a medias.

use crate::error::StoreError;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Contador para nombres de archivos temporales únicos en el proceso
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Directorio servido, de solo lectura después del arranque
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Crea un almacén sobre el directorio dado (no lo crea en disco)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directorio raíz del almacén
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resuelve un nombre de la URL a un path confinado al directorio
    ///
    /// # Errores
    ///
    /// `InvalidPath` si el nombre intentaría salir del directorio.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, StoreError> {
        if name.is_empty() || name.starts_with('/') || name.contains('\\') || name.contains('\0') {
            return Err(StoreError::InvalidPath(name.to_string()));
        }

        let mut path = self.root.clone();
        for segment in name.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(StoreError::InvalidPath(name.to_string()));
            }
            path.push(segment);
        }

        Ok(path)
    }

    /// Lee el archivo completo
    ///
    /// # Errores
    ///
    /// - `NotFound` si no existe (o es un directorio)
    /// - `Io` para cualquier otro fallo de lectura
    pub fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(name)?;

        if path.is_dir() {
            return Err(StoreError::NotFound(name.to_string()));
        }

        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => StoreError::Io(e),
        })
    }

    /// Escribe el archivo completo, creándolo o reemplazándolo
    pub fn write(&self, name: &str, contents: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve(name)?;
        let temp_path = Self::temp_path_for(&path);

        let result = Self::write_then_rename(&temp_path, &path, contents);
        if result.is_err() {
            // El temporal puede no existir si falló el create
            let _ = fs::remove_file(&temp_path);
        }
        result.map_err(StoreError::Io)
    }

    fn write_then_rename(temp_path: &Path, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        drop(file);
        fs::rename(temp_path, path)
    }

    /// `<dir>/.<file>.<pid>.<n>.tmp`, junto al destino para que el rename
    /// no cruce sistemas de archivos
    fn temp_path_for(path: &Path) -> PathBuf {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_name = format!(".{}.{}.{}.tmp", file_name, std::process::id(), n);
        path.with_file_name(temp_name)
    }
}
