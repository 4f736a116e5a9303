//! Time series types with validation guarantees.

use std::ops::Index;

use crate::error::DtwError;

/// Owned, validated time series. Guaranteed non-empty with all finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries(Vec<f64>);

impl TimeSeries {
    /// Create a new time series, validating that it is non-empty and all values are finite.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySeries`] | `values` is empty |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(values: Vec<f64>) -> Result<Self, DtwError> {
        validate(&values)?;
        Ok(Self(values))
    }

    /// Borrow this series as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> TimeSeriesView<'_> {
        TimeSeriesView(&self.0)
    }

    /// Return the number of time steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a constructed series; present for the
    /// `len_without_is_empty` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[f64]> for TimeSeries {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for TimeSeries {
    type Error = DtwError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

/// Borrowed, validated view into a time series. Zero-copy reference.
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesView<'a>(&'a [f64]);

impl<'a> TimeSeriesView<'a> {
    /// Create a new view, validating that the slice is non-empty and all values are finite.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySeries`] | `slice` is empty |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(slice: &'a [f64]) -> Result<Self, DtwError> {
        validate(slice)?;
        Ok(Self(slice))
    }

    /// Return the underlying slice.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.0
    }

    /// Return the number of time steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a constructed view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Index<usize> for TimeSeriesView<'_> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl AsRef<[f64]> for TimeSeriesView<'_> {
    fn as_ref(&self) -> &[f64] {
        self.0
    }
}

/// A time series tagged with the integer class label it belongs to.
///
/// The label is carried for nearest-neighbour classification only; the
/// alignment engine never looks at it.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSeries {
    label: i64,
    series: TimeSeries,
}

impl LabeledSeries {
    /// Pair a validated series with its class label.
    #[must_use]
    pub fn new(label: i64, series: TimeSeries) -> Self {
        Self { label, series }
    }

    /// Return the class label.
    #[must_use]
    pub fn label(&self) -> i64 {
        self.label
    }

    /// Return the underlying series.
    #[must_use]
    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    /// Borrow the underlying series as a view.
    #[must_use]
    pub fn as_view(&self) -> TimeSeriesView<'_> {
        self.series.as_view()
    }

    /// Return the number of time steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Always `false`: the wrapped series is validated non-empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

fn validate(values: &[f64]) -> Result<(), DtwError> {
    if values.is_empty() {
        return Err(DtwError::EmptySeries);
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(DtwError::NonFiniteValue { index });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_vec() {
        let result = TimeSeries::new(vec![]);
        assert!(matches!(result, Err(DtwError::EmptySeries)));
    }

    #[test]
    fn rejects_nan() {
        let result = TimeSeries::new(vec![1.0, f64::NAN, 3.0]);
        assert!(matches!(result, Err(DtwError::NonFiniteValue { index: 1 })));
    }

    #[test]
    fn rejects_neg_infinity() {
        let result = TimeSeries::new(vec![f64::NEG_INFINITY, 2.0]);
        assert!(matches!(result, Err(DtwError::NonFiniteValue { index: 0 })));
    }

    #[test]
    fn accepts_valid_series() {
        let ts = TimeSeries::new(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(ts.len(), 3);
        assert_eq!(ts.as_ref(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn view_rejects_empty() {
        let result = TimeSeriesView::new(&[]);
        assert!(matches!(result, Err(DtwError::EmptySeries)));
    }

    #[test]
    fn view_indexing() {
        let data = [10.0, 20.0, 30.0];
        let view = TimeSeriesView::new(&data).unwrap();
        assert_eq!(view[0], 10.0);
        assert_eq!(view[2], 30.0);
    }

    #[test]
    fn try_from_vec() {
        let ts: Result<TimeSeries, _> = vec![1.0, 2.0].try_into();
        assert!(ts.is_ok());
    }

    #[test]
    fn labeled_series_keeps_label_and_values() {
        let s = LabeledSeries::new(-3, TimeSeries::new(vec![0.5, 1.5]).unwrap());
        assert_eq!(s.label(), -3);
        assert_eq!(s.len(), 2);
        assert_eq!(s.as_view().as_slice(), &[0.5, 1.5]);
    }
}
