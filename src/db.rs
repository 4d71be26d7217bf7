pub mod elspot;
