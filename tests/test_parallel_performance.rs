use ha9class::core::HAlphaClassifier;
use ndarray::Array2;
use std::time::Instant;

#[test]
fn test_vectorized_vs_sequential_performance() {
    // Initialize logging to see performance metrics
    let _ = env_logger::builder().is_test(true).try_init();

    let (rows, cols) = (1024, 1024);
    let h = Array2::from_shape_fn((rows, cols), |(i, j)| ((i * 7 + j * 13) % 1000) as f32 / 1000.0);
    let alpha = Array2::from_shape_fn((rows, cols), |(i, j)| ((i * 31 + j * 17) % 900) as f32 / 10.0);
    let classifier = HAlphaClassifier::standard();

    println!("\n=== Classification Performance: Sequential vs Vectorized ===");

    let sequential_start = Instant::now();
    let sequential = classifier
        .classify_sequential(&h, &alpha, None)
        .expect("Sequential classification failed");
    let sequential_time = sequential_start.elapsed();

    let vectorized_start = Instant::now();
    let vectorized = classifier
        .classify(&h, &alpha, None)
        .expect("Vectorized classification failed");
    let vectorized_time = vectorized_start.elapsed();

    let total_pixels = (rows * cols) as f64;
    println!("  - Image size: {} x {} = {} pixels", cols, rows, rows * cols);
    println!(
        "  - Sequential: {:.3} s ({:.0} pixels/s)",
        sequential_time.as_secs_f64(),
        total_pixels / sequential_time.as_secs_f64()
    );
    println!(
        "  - Vectorized: {:.3} s ({:.0} pixels/s)",
        vectorized_time.as_secs_f64(),
        total_pixels / vectorized_time.as_secs_f64()
    );
    println!(
        "  - Speedup: {:.2}x",
        sequential_time.as_secs_f64() / vectorized_time.as_secs_f64().max(1e-9)
    );

    // Output must be bit-identical regardless of evaluation strategy
    assert_eq!(sequential, vectorized);
    assert!(vectorized.iter().all(|&c| (1..=9).contains(&c)));
}
