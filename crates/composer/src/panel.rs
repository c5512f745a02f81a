/// A tweakable value exposed on the debug panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelParam {
    Float {
        label: String,
        value: f32,
        min: f32,
        max: f32,
    },
    Toggle {
        label: String,
        value: bool,
    },
}

impl PanelParam {
    pub fn label(&self) -> &str {
        match self {
            Self::Float { label, .. } | Self::Toggle { label, .. } => label,
        }
    }
}

/// Debug parameter panel drawn with egui.
///
/// Starts with no parameters; it exists so tweakables can be registered later
/// without touching the frame driver.
#[derive(Debug, Clone)]
pub struct DebugPanel {
    title: String,
    params: Vec<PanelParam>,
    visible: bool,
}

impl Default for DebugPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugPanel {
    pub fn new() -> Self {
        Self {
            title: "Controls".into(),
            params: Vec::new(),
            visible: true,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn params(&self) -> &[PanelParam] {
        &self.params
    }

    pub fn add_param(&mut self, param: PanelParam) {
        self.params.push(param);
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        if !self.visible {
            return;
        }
        egui::Window::new(self.title.as_str())
            .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                for param in &mut self.params {
                    match param {
                        PanelParam::Float {
                            label,
                            value,
                            min,
                            max,
                        } => {
                            ui.add(egui::Slider::new(value, *min..=*max).text(label.as_str()));
                        }
                        PanelParam::Toggle { label, value } => {
                            ui.checkbox(value, label.as_str());
                        }
                    }
                }
            });
    }
}
