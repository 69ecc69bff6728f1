pub mod downloaders;
