pub mod genai;
