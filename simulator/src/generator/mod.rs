pub mod phaser;
pub mod scene;
pub mod template;
