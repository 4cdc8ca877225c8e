use dexscope_core::discovery::{DiscoveryRequest, FilterForm};

/// One editable cell of the filter dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Chain,
    Limit,
    SortMetric,
    SortTimeframe,
    SortOrder,
    Metric(u32),
    Timeframe(u32),
    Operator(u32),
    Value(u32),
}

impl FilterField {
    pub fn condition(self) -> Option<u32> {
        match self {
            FilterField::Metric(id)
            | FilterField::Timeframe(id)
            | FilterField::Operator(id)
            | FilterField::Value(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterModal {
    pub open: bool,
    pub form: FilterForm,
    focus: usize,
}

impl FilterModal {
    /// Cells in display order: request settings, then four per condition.
    pub fn fields(&self) -> Vec<FilterField> {
        let mut fields = vec![
            FilterField::Chain,
            FilterField::Limit,
            FilterField::SortMetric,
            FilterField::SortTimeframe,
            FilterField::SortOrder,
        ];
        for condition in &self.form.conditions {
            fields.extend([
                FilterField::Metric(condition.id),
                FilterField::Timeframe(condition.id),
                FilterField::Operator(condition.id),
                FilterField::Value(condition.id),
            ]);
        }
        fields
    }

    pub fn focused(&self) -> FilterField {
        let fields = self.fields();
        fields
            .get(self.focus.min(fields.len() - 1))
            .copied()
            .unwrap_or(FilterField::Chain)
    }

    pub fn move_focus(&mut self, delta: isize) {
        let len = self.fields().len() as isize;
        self.focus = (self.focus as isize + delta).rem_euclid(len) as usize;
    }

    /// Cycles the focused cell's value. Value cells are typed, not cycled.
    pub fn adjust(&mut self, forward: bool) {
        let field = self.focused();
        let form = &mut self.form;
        match field {
            FilterField::Chain => form.cycle_chain(forward),
            FilterField::Limit => form.cycle_limit(),
            FilterField::SortMetric => {
                form.sort.metric = if forward {
                    form.sort.metric.next()
                } else {
                    form.sort.metric.prev()
                }
            }
            FilterField::SortTimeframe => {
                form.sort.timeframe = if forward {
                    form.sort.timeframe.next()
                } else {
                    form.sort.timeframe.prev()
                }
            }
            FilterField::SortOrder => form.sort.descending = !form.sort.descending,
            FilterField::Metric(id) => {
                if let Some(condition) = form.condition_mut(id) {
                    condition.metric = if forward {
                        condition.metric.next()
                    } else {
                        condition.metric.prev()
                    };
                }
            }
            FilterField::Timeframe(id) => {
                if let Some(condition) = form.condition_mut(id) {
                    condition.timeframe = if forward {
                        condition.timeframe.next()
                    } else {
                        condition.timeframe.prev()
                    };
                }
            }
            FilterField::Operator(id) => {
                if let Some(condition) = form.condition_mut(id) {
                    condition.operator = condition.operator.next();
                }
            }
            FilterField::Value(_) => {}
        }
    }

    /// Digits, one decimal point and a leading minus are accepted.
    pub fn type_char(&mut self, c: char) {
        let FilterField::Value(id) = self.focused() else {
            return;
        };
        let Some(condition) = self.form.condition_mut(id) else {
            return;
        };
        let accepted = c.is_ascii_digit()
            || (c == '.' && !condition.value.contains('.'))
            || (c == '-' && condition.value.is_empty());
        if accepted {
            condition.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let FilterField::Value(id) = self.focused() {
            if let Some(condition) = self.form.condition_mut(id) {
                condition.value.pop();
            }
        }
    }

    pub fn add_condition(&mut self) {
        let id = self.form.add_condition();
        if let Some(index) = self
            .fields()
            .iter()
            .position(|f| *f == FilterField::Metric(id))
        {
            self.focus = index;
        }
    }

    /// Drops the condition under the cursor. The last condition is kept.
    pub fn remove_focused_condition(&mut self) -> bool {
        let Some(id) = self.focused().condition() else {
            return false;
        };
        if self.form.conditions.len() <= 1 {
            return false;
        }
        let removed = self.form.remove_condition(id);
        if removed {
            self.focus = self.focus.min(self.fields().len() - 1);
        }
        removed
    }

    pub fn request(&self) -> DiscoveryRequest {
        self.form.to_request()
    }
}
