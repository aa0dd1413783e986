use console::Style;
use sizer_core::crop::CropGeometry;
use sizer_core::form::UploadForm;
use sizer_core::selection::PendingFile;
use sizer_core::upload::SubmissionResult;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    ratio: Style,
    disabled: Style,
    path: Style,
    error: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            ratio: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            error: Style::new().red().bold(),
        }
    }
}

pub fn print_upload_summary(url: &str, file: &PendingFile, form: &UploadForm, ratio_label: &str) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Sizer Upload"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("File"),
        s.path.apply_to(&file.name)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Type"),
        s.value.apply_to(&file.mime)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Endpoint"),
        s.path.apply_to(url)
    );
    println!();

    // Crop
    println!("  {}", s.header.apply_to("Crop"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Ratio"),
        s.ratio.apply_to(ratio_label)
    );
    print_crop_box(&s, form.crop);
    println!();

    // Size
    println!("  {}", s.header.apply_to("Size"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Minimum"),
        s.value.apply_to(format!("{} MB", form.min_size_mb))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Target"),
        s.value.apply_to(format!("{} MB", form.target_size_mb))
    );
    println!();
}

fn print_crop_box(s: &Styles, crop: Option<CropGeometry>) {
    match crop {
        Some(crop) => println!(
            "    {:<12}{}",
            s.label.apply_to("Box"),
            s.value.apply_to(crop)
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Box"),
            s.disabled.apply_to("whole image")
        ),
    }
}

pub fn print_result(result: &SubmissionResult) {
    let s = Styles::new();

    match result {
        SubmissionResult::Success {
            filename,
            location,
            size,
        } => {
            println!(
                "  {:<14}{}",
                s.label.apply_to("Saved"),
                s.path.apply_to(location.display())
            );
            println!(
                "  {:<14}{}",
                s.label.apply_to("Name"),
                s.value.apply_to(filename)
            );
            println!(
                "  {:<14}{}",
                s.label.apply_to("Size"),
                s.value.apply_to(format!("{:.2} MB", *size as f64 / (1024.0 * 1024.0)))
            );
        }
        SubmissionResult::Failure { message } => {
            println!(
                "  {:<14}{}",
                s.label.apply_to("Error"),
                s.error.apply_to(message)
            );
        }
    }
    println!();
}
