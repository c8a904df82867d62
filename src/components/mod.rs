// Export components
pub mod editor;

// Re-export the editor handle
pub use editor::EditorHandle;
