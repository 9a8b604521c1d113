//! File picker for art uploads and record export
//!
//! Browser builds open a hidden `<input type="file">` and read the chosen file
//! with a `FileReader`; saves go through a temporary download link. Results
//! come back through a queue drained each frame.

use bevy::prelude::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use boxart_core::ImageSlot;

/// File picker plugin
pub struct FilePickerPlugin;

impl Plugin for FilePickerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FilePickerState>()
            .init_resource::<PendingFileResults>()
            .add_systems(Update, process_file_results);
    }
}

/// Type of file operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    /// Pick a file to open/upload
    Open,
    /// Save content to a file
    Save,
}

/// What the picker is being used for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePickerContext {
    /// Art for one slot of the current record
    ImageUpload(ImageSlot),
    /// Current record as JSON
    RecordExport,
}

/// File filter for the picker dialog
#[derive(Debug, Clone)]
pub struct FileFilter {
    /// Display name (e.g., "Images")
    pub name: String,
    /// Accept tokens: extensions without dots, or MIME patterns like `image/*`
    pub accept: Vec<String>,
}

impl FileFilter {
    pub fn images() -> Self {
        Self {
            name: "Images".to_string(),
            accept: vec!["image/*".to_string()],
        }
    }

    /// Convert to accept string for HTML input element
    pub fn to_accept_string(&self) -> String {
        if self.accept.is_empty() {
            "*".to_string()
        } else {
            self.accept
                .iter()
                .map(|token| {
                    if token.contains('/') {
                        token.clone()
                    } else {
                        format!(".{}", token)
                    }
                })
                .collect::<Vec<_>>()
                .join(",")
        }
    }
}

/// Result from a file picker operation
#[derive(Debug, Clone)]
pub struct FilePickerResult {
    /// The context this result is for
    pub context: FilePickerContext,
    /// The operation that was performed
    pub operation: FileOperation,
    /// Filename (without path)
    pub filename: String,
    /// MIME type reported by the browser, if any
    pub mime: Option<String>,
    /// File content (for open operations)
    pub content: Option<Vec<u8>>,
    /// Error message if failed
    pub error: Option<String>,
}

/// Pending file results from JavaScript callbacks
#[derive(Resource, Default)]
pub struct PendingFileResults(pub Arc<Mutex<VecDeque<FilePickerResult>>>);

/// File picker state
#[derive(Resource, Default)]
pub struct FilePickerState {
    /// Completed results ready for processing
    pub completed_results: VecDeque<FilePickerResult>,
}

impl FilePickerState {
    /// Take the next completed result
    pub fn take_result(&mut self) -> Option<FilePickerResult> {
        self.completed_results.pop_front()
    }
}

/// System to process file results from JavaScript callbacks
fn process_file_results(
    pending: Res<PendingFileResults>,
    mut picker_state: ResMut<FilePickerState>,
) {
    // Move results from pending (JS callback) to completed (ready for UI)
    if let Ok(mut pending_results) = pending.0.lock() {
        while let Some(result) = pending_results.pop_front() {
            picker_state.completed_results.push_back(result);
        }
    }
}

// ============================================================================
// JavaScript Interop (WASM only)
// ============================================================================

#[cfg(target_arch = "wasm32")]
mod js_interop {
    use super::*;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::{Blob, HtmlInputElement, Url};

    fn push(pending: &Arc<Mutex<VecDeque<FilePickerResult>>>, result: FilePickerResult) {
        if let Ok(mut results) = pending.lock() {
            results.push_back(result);
        }
    }

    fn failed(context: FilePickerContext, operation: FileOperation, error: String) -> FilePickerResult {
        FilePickerResult {
            context,
            operation,
            filename: String::new(),
            mime: None,
            content: None,
            error: Some(error),
        }
    }

    /// Open a file picker dialog using HTML input element
    pub fn open_file_picker(
        accept: &str,
        pending_results: Arc<Mutex<VecDeque<FilePickerResult>>>,
        context: FilePickerContext,
    ) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            tracing::error!("open_file_picker: no document");
            return;
        };

        // Create a hidden file input element
        let input: HtmlInputElement = match document
            .create_element("input")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            Some(input) => input,
            None => {
                tracing::error!("open_file_picker: failed to create input element");
                return;
            }
        };

        input.set_type("file");
        input.set_accept(accept);
        input.style().set_property("display", "none").ok();

        match document.body() {
            Some(body) => {
                if let Err(e) = body.append_child(&input) {
                    tracing::error!("open_file_picker: failed to append input to body: {:?}", e);
                    return;
                }
            }
            None => {
                tracing::error!("open_file_picker: no document body");
                return;
            }
        }

        let input_clone = input.clone();
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let file = input_clone.files().and_then(|files| files.get(0));
            match file {
                Some(file) => read_file(file, pending_results.clone(), context.clone()),
                None => tracing::debug!("open_file_picker: no file selected"),
            }

            // Remove the input element
            if let Some(parent) = input_clone.parent_node() {
                parent.remove_child(&input_clone).ok();
            }
        }) as Box<dyn FnMut(_)>);

        input.set_onchange(Some(closure.as_ref().unchecked_ref()));
        closure.forget();

        input.click();
    }

    fn read_file(
        file: web_sys::File,
        pending: Arc<Mutex<VecDeque<FilePickerResult>>>,
        context: FilePickerContext,
    ) {
        let filename = file.name();
        let mime = Some(file.type_()).filter(|t| !t.is_empty());

        let reader = match web_sys::FileReader::new() {
            Ok(reader) => reader,
            Err(e) => {
                push(&pending, failed(context, FileOperation::Open, format!("{:?}", e)));
                return;
            }
        };
        let reader_clone = reader.clone();

        let onload = Closure::wrap(Box::new(move |_: web_sys::Event| {
            let content = reader_clone
                .result()
                .ok()
                .and_then(|result| result.dyn_into::<js_sys::ArrayBuffer>().ok())
                .map(|buffer| js_sys::Uint8Array::new(&buffer).to_vec());

            let result = match content {
                Some(content) => FilePickerResult {
                    context: context.clone(),
                    operation: FileOperation::Open,
                    filename: filename.clone(),
                    mime: mime.clone(),
                    content: Some(content),
                    error: None,
                },
                None => failed(
                    context.clone(),
                    FileOperation::Open,
                    format!("could not read {}", filename),
                ),
            };
            push(&pending, result);
        }) as Box<dyn FnMut(_)>);

        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        reader.read_as_array_buffer(&file).ok();
    }

    /// Save content to a file using download
    pub fn save_file(
        filename: &str,
        content: &[u8],
        mime_type: &str,
        pending_results: Arc<Mutex<VecDeque<FilePickerResult>>>,
        context: FilePickerContext,
    ) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Create blob from content
        let uint8_array = js_sys::Uint8Array::from(content);
        let array = js_sys::Array::new();
        array.push(&uint8_array.buffer());

        let blob_options = web_sys::BlobPropertyBag::new();
        blob_options.set_type(mime_type);

        let url = match Blob::new_with_u8_array_sequence_and_options(&array, &blob_options)
            .and_then(|blob| Url::create_object_url_with_blob(&blob))
        {
            Ok(url) => url,
            Err(e) => {
                push(&pending_results, failed(context, FileOperation::Save, format!("{:?}", e)));
                return;
            }
        };

        // Create temporary anchor element for download
        let Ok(anchor) = document.create_element("a") else {
            return;
        };
        anchor.set_attribute("href", &url).ok();
        anchor.set_attribute("download", filename).ok();

        if let Some(body) = document.body() {
            body.append_child(&anchor).ok();

            // Trigger download
            if let Some(html_el) = anchor.dyn_ref::<web_sys::HtmlElement>() {
                html_el.click();
            }

            body.remove_child(&anchor).ok();
        }

        // Revoke URL after a delay
        let url_clone = url.clone();
        let closure = Closure::wrap(Box::new(move || {
            Url::revoke_object_url(&url_clone).ok();
        }) as Box<dyn FnMut()>);

        window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                1000,
            )
            .ok();
        closure.forget();

        push(
            &pending_results,
            FilePickerResult {
                context,
                operation: FileOperation::Save,
                filename: filename.to_string(),
                mime: Some(mime_type.to_string()),
                content: None,
                error: None,
            },
        );
    }
}

// Native fallbacks
#[cfg(not(target_arch = "wasm32"))]
mod js_interop {
    use super::*;

    pub fn open_file_picker(
        _accept: &str,
        pending_results: Arc<Mutex<VecDeque<FilePickerResult>>>,
        context: FilePickerContext,
    ) {
        // No native dialog; art paths are entered in the URL field instead
        if let Ok(mut results) = pending_results.lock() {
            results.push_back(FilePickerResult {
                context,
                operation: FileOperation::Open,
                filename: String::new(),
                mime: None,
                content: None,
                error: Some("File picker not supported on this platform".to_string()),
            });
        }
    }

    /// Writes into the working directory
    pub fn save_file(
        filename: &str,
        content: &[u8],
        mime_type: &str,
        pending_results: Arc<Mutex<VecDeque<FilePickerResult>>>,
        context: FilePickerContext,
    ) {
        let error = std::fs::write(filename, content).err().map(|e| e.to_string());
        if let Ok(mut results) = pending_results.lock() {
            results.push_back(FilePickerResult {
                context,
                operation: FileOperation::Save,
                filename: filename.to_string(),
                mime: Some(mime_type.to_string()),
                content: None,
                error,
            });
        }
    }
}

// Re-export the interop functions
pub use js_interop::{open_file_picker, save_file};

/// Helper to trigger file open from UI
pub fn trigger_file_open(
    pending: &PendingFileResults,
    context: FilePickerContext,
    filter: FileFilter,
) {
    let accept = filter.to_accept_string();
    tracing::debug!("Opening {} picker for {:?}", filter.name, context);
    open_file_picker(&accept, pending.0.clone(), context);
}

/// Helper to trigger file save from UI
pub fn trigger_file_save(
    pending: &PendingFileResults,
    context: FilePickerContext,
    filename: &str,
    content: &[u8],
    mime_type: &str,
) {
    save_file(filename, content, mime_type, pending.0.clone(), context);
}

/// File name for an exported record
pub fn export_filename(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "boxart.json".to_string()
    } else {
        format!("{}.json", stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_string() {
        assert_eq!(FileFilter::images().to_accept_string(), "image/*");
        let filter = FileFilter {
            name: "Art".to_string(),
            accept: vec!["png".to_string(), "image/webp".to_string()],
        };
        assert_eq!(filter.to_accept_string(), ".png,image/webp");
    }

    #[test]
    fn test_results_reach_completed_queue_in_order() {
        use bevy::ecs::system::RunSystemOnce;

        let mut world = World::new();
        world.init_resource::<FilePickerState>();
        let pending = PendingFileResults::default();
        for name in ["front.png", "boxart.json"] {
            pending.0.lock().unwrap().push_back(FilePickerResult {
                context: FilePickerContext::RecordExport,
                operation: FileOperation::Save,
                filename: name.to_string(),
                mime: None,
                content: None,
                error: None,
            });
        }
        world.insert_resource(pending);

        world.run_system_once(process_file_results).unwrap();

        assert!(world.resource::<PendingFileResults>().0.lock().unwrap().is_empty());
        let mut state = world.resource_mut::<FilePickerState>();
        assert_eq!(state.take_result().map(|r| r.filename).as_deref(), Some("front.png"));
        assert_eq!(state.take_result().map(|r| r.filename).as_deref(), Some("boxart.json"));
        assert!(state.take_result().is_none());
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("My Custom Box Art"), "My_Custom_Box_Art.json");
        assert_eq!(export_filename("  "), "boxart.json");
    }
}
