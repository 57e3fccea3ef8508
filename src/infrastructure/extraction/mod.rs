mod engine_factory;
mod scripted_engine;
mod textract_engine;

pub use engine_factory::ExtractionEngineFactory;
pub use scripted_engine::ScriptedExtractionEngine;
pub use textract_engine::TextractEngine;
