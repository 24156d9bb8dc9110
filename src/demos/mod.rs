//! Catalogue of example problems, grouped by category.

use crate::ui::style;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::fmt::Write as _;

pub struct Category {
    pub name: &'static str,
    pub problems: &'static [&'static str],
}

pub const CATALOGUE: &[Category] = &[
    Category {
        name: "Beginner",
        problems: &[
            "What is 15% of 240?",
            "Solve for x: 3x + 7 = 22",
            "Find the area of a circle with radius 5",
            "Convert 45 degrees to radians",
            "Calculate the hypotenuse of a right triangle with legs 3 and 4",
        ],
    },
    Category {
        name: "Intermediate",
        problems: &[
            "Solve the quadratic equation: 2x^2 + 5x - 3 = 0",
            "Graph y = x^2 - 4x + 3 and find its vertex",
            "Calculate mean, median, and standard deviation of [12, 15, 18, 22, 25, 28]",
            "Find where f(x) = x^3 - 3x^2 + 2 crosses the x-axis",
            "Solve the system of equations: 2x + 3y = 7, x - y = 1",
            "Find the area of a triangle with sides 5, 6, and 7",
            "Calculate compound interest: $1000 at 5% annually for 10 years",
        ],
    },
    Category {
        name: "Advanced",
        problems: &[
            "Find the derivative of sin(x) * e^x and plot both functions",
            "Calculate the integral of x^2 from 0 to 5",
            "Use Newton's method to find the root of x^3 - 2x - 5 = 0",
            "Perform linear regression on data points and plot the results",
            "Find the Fourier series of a square wave",
            "Solve the differential equation dy/dx = x*y with initial condition y(0) = 1",
            "Calculate the eigenvalues of a 3x3 matrix",
        ],
    },
    Category {
        name: "Statistics & Data Science",
        problems: &[
            "Generate 1000 random normal samples and create a histogram",
            "Calculate correlation between two datasets",
            "Perform a t-test on two groups of data",
            "Create a box plot showing quartiles and outliers",
            "Fit a polynomial regression to noisy data",
            "Generate and visualize a binomial distribution",
        ],
    },
    Category {
        name: "Calculus & Analysis",
        problems: &[
            "Find critical points of f(x) = x^4 - 4x^3 + 6x^2 - 4x + 1",
            "Calculate the Taylor series expansion of e^x around x=0",
            "Find the area between curves y = x^2 and y = 2x",
            "Optimize f(x,y) = x^2 + y^2 subject to x + y = 1",
            "Find the limit of (sin(x)/x) as x approaches 0",
            "Plot the convergence of a series",
        ],
    },
    Category {
        name: "Geometry & Trigonometry",
        problems: &[
            "Convert complex number 3 + 4i to polar form and visualize",
            "Calculate all angles in a triangle with sides 3, 4, 5",
            "Find the distance between two points in 3D space",
            "Calculate the volume of a sphere with radius 7",
            "Graph sin(x), cos(x), and tan(x) on the same plot",
            "Find the equation of a line passing through two points",
        ],
    },
    Category {
        name: "Financial Mathematics",
        problems: &[
            "Compare simple vs compound interest over 20 years",
            "Calculate monthly payments for a $300,000 mortgage at 4.5%",
            "Determine how much to save monthly to reach $100,000 in 15 years",
            "Calculate the present value of future cash flows",
            "Model investment growth with different scenarios",
            "Calculate break-even point for a business model",
        ],
    },
];

/// Exact (case-sensitive) category lookup.
pub fn category(name: &str) -> Option<&'static Category> {
    CATALOGUE.iter().find(|c| c.name == name)
}

/// A problem from `category`, or from the whole catalogue when the category
/// is absent or unknown.
pub fn random_problem<R: Rng + ?Sized>(category_name: Option<&str>, rng: &mut R) -> &'static str {
    if let Some(name) = category_name
        && let Some(found) = category(name)
        && let Some(problem) = found.problems.choose(rng).copied()
    {
        return problem;
    }
    if let Some(name) = category_name {
        tracing::debug!(category = name, "unknown category; picking from all problems");
    }
    let all: Vec<&'static str> = CATALOGUE
        .iter()
        .flat_map(|c| c.problems.iter().copied())
        .collect();
    all.choose(rng).copied().unwrap_or_default()
}

pub fn render_catalogue() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style::header("🧮 Demo Problems for Interactive Math Solver"));
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(
        out,
        "Here are example problems you can try, organized by difficulty:\n"
    );

    for category in CATALOGUE {
        let _ = writeln!(out, "### {}", style::accent(category.name));
        let _ = writeln!(out, "{}", "-".repeat(category.name.len() + 4));
        for (i, problem) in category.problems.iter().enumerate() {
            let _ = writeln!(out, "{:2}. {problem}", i + 1);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "💡 Tips:");
    for tip in [
        "Copy and paste any question into the math solver",
        "Modify problems to suit your specific needs",
        "Ask follow-up questions to dive deeper",
        "All visualizations and reports will be saved automatically",
    ] {
        let _ = writeln!(out, "   • {tip}");
    }
    let _ = writeln!(
        out,
        "\n🚀 Start the solver with: {}",
        style::yellow("math-solver")
    );
    out
}
