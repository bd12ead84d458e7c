mod engine;
mod roller;
