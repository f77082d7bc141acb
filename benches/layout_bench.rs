use std::alloc::{GlobalAlloc, Layout, System};
use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use furigana::{FuriganaView, LayoutConstraints, MeasureSpec, ViewConfig, WrapPolicy};
use furigana_embedded_graphics::EgTextMeasurer;

const DISPLAY_WIDTH: i32 = 480;
const DISPLAY_HEIGHT: i32 = 800;

const FIXTURES: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "short-ascii",
        "watashi wa nihongo o benkyou shite imasu",
        &[("nihongo", "NIHONGO"), ("benkyou", "BENKYOU")],
    ),
    (
        "wagahai-opening",
        "吾輩は猫である。名前はまだ無い。どこで生れたかとんと見当がつかぬ。何でも薄暗いじめじめした所でニャーニャー泣いていた事だけは記憶している。吾輩はここで始めて人間というものを見た。",
        &[
            ("吾輩", "わがはい"),
            ("名前", "なまえ"),
            ("見当", "けんとう"),
            ("薄暗", "うすぐら"),
            ("記憶", "きおく"),
            ("人間", "にんげん"),
        ],
    ),
    (
        "dense-repeats",
        "日本の山と日本の川と日本の海と日本の空と日本の町と日本の村と日本の森と日本の島",
        &[("日本", "にほん"), ("山", "やま"), ("川", "かわ"), ("海", "うみ")],
    ),
];

struct TrackingAllocator;

static CURRENT_ALLOC_BYTES: AtomicUsize = AtomicUsize::new(0);
static PEAK_ALLOC_BYTES: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL_ALLOCATOR: TrackingAllocator = TrackingAllocator;

fn current_alloc_bytes() -> usize {
    CURRENT_ALLOC_BYTES.load(Ordering::Relaxed)
}

fn peak_alloc_bytes() -> usize {
    PEAK_ALLOC_BYTES.load(Ordering::Relaxed)
}

fn reset_peak_alloc_bytes() {
    PEAK_ALLOC_BYTES.store(current_alloc_bytes(), Ordering::Relaxed);
}

fn add_current_alloc_bytes(delta: usize) {
    let current = CURRENT_ALLOC_BYTES.fetch_add(delta, Ordering::Relaxed) + delta;
    PEAK_ALLOC_BYTES.fetch_max(current, Ordering::Relaxed);
}

fn sub_current_alloc_bytes(delta: usize) {
    let _ = CURRENT_ALLOC_BYTES.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_sub(delta))
    });
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            add_current_alloc_bytes(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        sub_current_alloc_bytes(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            if new_size >= layout.size() {
                add_current_alloc_bytes(new_size - layout.size());
            } else {
                sub_current_alloc_bytes(layout.size() - new_size);
            }
        }
        new_ptr
    }
}

#[derive(Clone, Debug)]
struct CaseResult {
    fixture: &'static str,
    case: &'static str,
    iterations: usize,
    min_ns: u128,
    median_ns: u128,
    max_ns: u128,
    median_peak_heap_bytes: usize,
}

fn median<T: Copy>(sorted: &[T]) -> T {
    sorted[sorted.len() / 2]
}

fn run_case<F>(
    fixture: &'static str,
    case: &'static str,
    warmup_iters: usize,
    measure_iters: usize,
    mut op: F,
) -> CaseResult
where
    F: FnMut() -> usize,
{
    for _ in 0..warmup_iters {
        black_box(op());
    }

    let mut time_samples = Vec::with_capacity(measure_iters);
    let mut mem_samples = Vec::with_capacity(measure_iters);
    for _ in 0..measure_iters {
        let baseline_alloc = current_alloc_bytes();
        reset_peak_alloc_bytes();
        let start = Instant::now();
        black_box(op());
        time_samples.push(start.elapsed().as_nanos());
        mem_samples.push(peak_alloc_bytes().saturating_sub(baseline_alloc));
    }
    time_samples.sort_unstable();
    mem_samples.sort_unstable();

    CaseResult {
        fixture,
        case,
        iterations: measure_iters,
        min_ns: time_samples[0],
        median_ns: median(&time_samples),
        max_ns: time_samples[time_samples.len() - 1],
        median_peak_heap_bytes: median(&mem_samples),
    }
}

fn build_view(text: &str, pairs: &[(&str, &str)], cfg: ViewConfig) -> FuriganaView {
    let mut view = FuriganaView::new(cfg, EgTextMeasurer::shared());
    view.set_source_text(text);
    view.set_annotations(pairs.iter().copied())
        .unwrap_or_else(|e| panic!("annotations rejected: {}", e));
    view
}

fn main() {
    let quick = std::env::args().any(|arg| arg == "--quick");
    let warmup_iters = if quick { 10 } else { 100 };
    let measure_iters = if quick { 50 } else { 1000 };

    println!("# furigana layout benchmark");
    println!(
        "# mode={} warmup_iters={} measure_iters={}",
        if quick { "quick" } else { "full" },
        warmup_iters,
        measure_iters
    );
    println!("fixture,case,iterations,min_ns,median_ns,max_ns,median_peak_heap_bytes");

    let narrow = LayoutConstraints::at_most_width(DISPLAY_WIDTH / 3);
    let page = LayoutConstraints::new(
        MeasureSpec::Exact(DISPLAY_WIDTH / 3),
        MeasureSpec::Exact(DISPLAY_HEIGHT / 8),
    );
    let greedy = ViewConfig {
        wrap_policy: WrapPolicy::GreedyMeasured,
        ..ViewConfig::default()
    };
    let first_only = ViewConfig {
        first_occurrence_only: true,
        ..ViewConfig::default()
    };

    let mut results = Vec::new();
    for &(fixture, text, pairs) in FIXTURES {
        results.push(run_case(
            fixture,
            "measure_unconstrained",
            warmup_iters,
            measure_iters,
            || {
                let mut view = build_view(text, pairs, ViewConfig::default());
                view.measure(LayoutConstraints::unconstrained()).0 as usize
            },
        ));

        results.push(run_case(
            fixture,
            "measure_wrapped_fixed",
            warmup_iters,
            measure_iters,
            || {
                let mut view = build_view(text, pairs, ViewConfig::default());
                view.measure(narrow);
                view.wrapped_lines().len()
            },
        ));

        results.push(run_case(
            fixture,
            "measure_wrapped_greedy",
            warmup_iters,
            measure_iters,
            || {
                let mut view = build_view(text, pairs, greedy);
                view.measure(narrow);
                view.wrapped_lines().len()
            },
        ));

        results.push(run_case(
            fixture,
            "measure_exact_page",
            warmup_iters,
            measure_iters,
            || {
                let mut view = build_view(text, pairs, ViewConfig::default());
                view.measure(page);
                view.wrapped_lines().len()
            },
        ));

        let mut wrapped = build_view(text, pairs, ViewConfig::default());
        wrapped.measure(narrow);
        results.push(run_case(
            fixture,
            "draw_pass_wrapped",
            warmup_iters,
            measure_iters,
            || wrapped.draw_commands().len(),
        ));

        let mut first = build_view(text, pairs, first_only);
        first.measure(narrow);
        results.push(run_case(
            fixture,
            "draw_pass_first_occurrence",
            warmup_iters,
            measure_iters,
            || first.draw_commands().len(),
        ));
    }

    for result in &results {
        println!(
            "{},{},{},{},{},{},{}",
            result.fixture,
            result.case,
            result.iterations,
            result.min_ns,
            result.median_ns,
            result.max_ns,
            result.median_peak_heap_bytes
        );
    }
}
